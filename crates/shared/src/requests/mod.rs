//! Request bodies and query strings, one module per route family.

mod assistant;
mod character;
mod graph;
mod story;
mod style;

pub use assistant::{ChatRequest, GrammarRequest, InterventionRequest, SpeechRequest};
pub use character::CreateCharacterRequest;
pub use graph::{CreateChoiceRequest, CreateNodeRequest, UpdateChoiceRequest};
pub use story::{CreateStoryRequest, LibraryQuery, UpdateStoryRequest};
pub use style::GenerateStyleRequest;
