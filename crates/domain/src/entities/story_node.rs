//! Story node - one narrative beat in an interactive story

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{NodeId, StoryId};
use crate::value_objects::word_count;

/// Narrative role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Plain prose leading on to the next beat
    #[default]
    Content,
    /// A beat that ends in reader choices
    Decision,
    /// A terminal beat
    Ending,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Content => "CONTENT",
            NodeType::Decision => "DECISION",
            NodeType::Ending => "ENDING",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONTENT" => Ok(NodeType::Content),
            "DECISION" => Ok(NodeType::Decision),
            "ENDING" => Ok(NodeType::Ending),
            _ => Err(DomainError::parse(format!("Unknown node type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    pub id: NodeId,
    pub story_id: StoryId,
    pub title: String,
    pub content: String,
    pub node_type: NodeType,
    pub is_start: bool,
    pub is_ending: bool,
    pub position: i32,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoryNode {
    pub fn new(
        story_id: StoryId,
        title: impl Into<String>,
        content: impl Into<String>,
        node_type: NodeType,
        now: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        Self {
            id: NodeId::new(),
            story_id,
            title: title.into(),
            word_count: word_count(&content),
            content,
            node_type,
            is_start: false,
            is_ending: node_type == NodeType::Ending,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn as_start(mut self) -> Self {
        self.is_start = true;
        self
    }

    pub fn with_ending(mut self, is_ending: bool) -> Self {
        self.is_ending = is_ending;
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Counted as an ending in structure statistics.
    pub fn ends_story(&self) -> bool {
        self.is_ending || self.node_type == NodeType::Ending
    }

    pub fn belongs_to(&self, story_id: StoryId) -> bool {
        self.story_id == story_id
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// `{id, title}` of a node, attached to choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub title: String,
}
