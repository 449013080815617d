//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod blob_store;
pub mod clock;
pub mod config;
pub mod openai;
pub mod ports;
pub mod sqlite;
