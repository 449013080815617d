//! Error type for the domain layer.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// An id string that is not a UUID
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// A value object name outside its fixed set
    #[error("{0}")]
    Parse(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Use in `FromStr` implementations when the input matches no variant.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_read_as_plain_messages() {
        let err = DomainError::parse("Unknown voice: robot");
        assert_eq!(err.to_string(), "Unknown voice: robot");
    }

    #[test]
    fn invalid_id_names_the_input() {
        let err = DomainError::invalid_id("StoryId: abc");
        assert_eq!(err.to_string(), "Invalid ID format: StoryId: abc");
    }
}
