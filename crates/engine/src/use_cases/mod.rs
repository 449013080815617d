//! Use cases - User story orchestration.
//!
//! Each module covers one area of the product and talks to infrastructure
//! only through port traits.

pub mod assistant;
pub mod authorization;
pub mod characters;
pub mod json_reply;
pub mod stories;
pub mod story_graph;
pub mod style;
pub mod upload;

pub use assistant::AssistantUseCases;
pub use authorization::StoryAccess;
pub use characters::CharacterOps;
pub use stories::StoryOps;
pub use story_graph::GraphOps;
pub use style::StyleOps;
pub use upload::UploadOps;
