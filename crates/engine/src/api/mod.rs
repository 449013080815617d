//! API layer - HTTP entry points.

pub mod auth;
pub mod error;
pub mod extract;
pub mod http;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApiError;
