//! Domain entities - identity-bearing records of the story platform

mod character;
mod choice;
mod story;
mod story_node;
mod style_profile;
mod user;

pub use character::{Character, Personality};
pub use choice::{Choice, ChoiceWithEndpoints};
pub use story::{LibraryEntry, Story, StoryKind, UNTITLED_STORY};
pub use story_node::{NodeSummary, NodeType, StoryNode};
pub use style_profile::StyleProfile;
pub use user::{Session, User};
