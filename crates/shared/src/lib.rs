//! World in Ink wire types.
//!
//! Everything that crosses the HTTP boundary lives here:
//! - request bodies and query strings, schema-checked with `validator`
//! - the `{success, data | error, code}` response envelope
//! - the [`ErrorCode`] taxonomy
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types plus schema rules
//! 2. **No domain IDs** - ids arrive as strings and are parsed by the engine

pub mod requests;
pub mod responses;
pub mod validation;

pub use requests::{
    ChatRequest, CreateCharacterRequest, CreateChoiceRequest, CreateNodeRequest,
    CreateStoryRequest, GenerateStyleRequest, GrammarRequest, InterventionRequest, LibraryQuery,
    SpeechRequest, UpdateChoiceRequest, UpdateStoryRequest,
};
pub use responses::{ApiResponse, ErrorCode, LibraryPage, Pagination};
pub use validation::first_violation;
