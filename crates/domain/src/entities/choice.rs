//! Choice - a reader-visible directed edge between two nodes of one story

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::story_node::NodeSummary;
use crate::ids::{ChoiceId, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: ChoiceId,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub position: i32,
    pub times_chosen: u32,
    pub created_at: DateTime<Utc>,
}

impl Choice {
    pub fn new(
        from_node_id: NodeId,
        to_node_id: NodeId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ChoiceId::new(),
            from_node_id,
            to_node_id,
            text: text.into(),
            emoji: None,
            position: 0,
            times_chosen: 0,
            created_at: now,
        }
    }

    pub fn with_emoji(mut self, emoji: Option<String>) -> Self {
        self.emoji = emoji.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Same ordered endpoint pair.
    pub fn connects(&self, from: NodeId, to: NodeId) -> bool {
        self.from_node_id == from && self.to_node_id == to
    }
}

/// A choice together with both endpoints' `{id, title}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceWithEndpoints {
    #[serde(flatten)]
    pub choice: Choice,
    pub from_node: NodeSummary,
    pub to_node: NodeSummary,
}
