//! World in Ink Engine library.
//!
//! This crate contains all server-side code for the story, interactive-story
//! and AI-writing backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Story, graph, character, assistant, style and upload flows
//! - `infrastructure/` - Ports plus their SQLite, OpenAI and filesystem adapters
//! - `api/` - HTTP entry points and session extraction
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
