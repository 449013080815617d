//! Aggregates - consistency boundaries spanning several entities

mod story_graph;

pub use story_graph::{GraphStats, NodeWithChoices, StoryGraph, StoryStructure, StructureNode};
