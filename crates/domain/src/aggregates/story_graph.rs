//! StoryGraph aggregate - the loaded node/choice set of one interactive story
//!
//! Built from whatever the repository returns; views and statistics are
//! computed from that snapshot rather than queried separately.

use serde::{Deserialize, Serialize};

use crate::entities::{Choice, StoryNode};
use crate::ids::{NodeId, StoryId};

#[derive(Debug, Clone, PartialEq)]
pub struct StoryGraph {
    story_id: StoryId,
    nodes: Vec<StoryNode>,
    choices: Vec<Choice>,
}

/// A node with its outgoing choices, as listed in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWithChoices {
    #[serde(flatten)]
    pub node: StoryNode,
    pub choices: Vec<Choice>,
}

/// A node with edges in both directions, as returned by the structure view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    #[serde(flatten)]
    pub node: StoryNode,
    pub outgoing_choices: Vec<Choice>,
    pub incoming_choices: Vec<Choice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: u32,
    pub total_endings: u32,
    pub total_choices: u32,
    pub total_words: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStructure {
    pub story_id: StoryId,
    pub nodes: Vec<StructureNode>,
    pub choices: Vec<Choice>,
    pub stats: GraphStats,
}

impl StoryGraph {
    /// Nodes are kept ordered by position, choices by position.
    pub fn new(story_id: StoryId, mut nodes: Vec<StoryNode>, mut choices: Vec<Choice>) -> Self {
        nodes.sort_by_key(|n| n.position);
        choices.sort_by_key(|c| c.position);
        Self {
            story_id,
            nodes,
            choices,
        }
    }

    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    pub fn nodes(&self) -> &[StoryNode] {
        &self.nodes
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn start_node(&self) -> Option<&StoryNode> {
        self.nodes.iter().find(|n| n.is_start)
    }

    pub fn outgoing(&self, node_id: NodeId) -> Vec<Choice> {
        self.choices
            .iter()
            .filter(|c| c.from_node_id == node_id)
            .cloned()
            .collect()
    }

    pub fn incoming(&self, node_id: NodeId) -> Vec<Choice> {
        self.choices
            .iter()
            .filter(|c| c.to_node_id == node_id)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.nodes.len() as u32,
            total_endings: self.nodes.iter().filter(|n| n.ends_story()).count() as u32,
            total_choices: self.choices.len() as u32,
            total_words: self.nodes.iter().map(|n| n.word_count).sum(),
        }
    }

    pub fn into_node_list(self) -> Vec<NodeWithChoices> {
        let choices = self.choices;
        self.nodes
            .into_iter()
            .map(|node| {
                let outgoing = choices
                    .iter()
                    .filter(|c| c.from_node_id == node.id)
                    .cloned()
                    .collect();
                NodeWithChoices {
                    node,
                    choices: outgoing,
                }
            })
            .collect()
    }

    pub fn into_structure(self) -> StoryStructure {
        let stats = self.stats();
        let nodes = self
            .nodes
            .iter()
            .map(|node| StructureNode {
                node: node.clone(),
                outgoing_choices: self.outgoing(node.id),
                incoming_choices: self.incoming(node.id),
            })
            .collect();
        StoryStructure {
            story_id: self.story_id,
            nodes,
            choices: self.choices,
            stats,
        }
    }
}
