//! Error to HTTP response mapping.
//!
//! Use-case errors convert into [`ApiError`], which renders the standard
//! `{"success":false,"error":...,"code":...}` envelope. Server-side failures
//! are logged here and the client only sees a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inkworld_shared::{ApiResponse, ErrorCode};

use crate::use_cases::{
    assistant::AiError, characters::CharacterError, stories::StoryError, story_graph::GraphError,
    style::StyleError, upload::UploadError,
};

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound,
    /// Schema rule or business rule failure, carrying the client message
    Validation(String),
    InsufficientData(String),
    LowConfidence(String),
    /// Logged with `detail`; the client gets a generic message for `code`.
    Internal { code: ErrorCode, detail: String },
}

impl ApiError {
    pub fn internal(code: ErrorCode, detail: impl ToString) -> Self {
        ApiError::Internal {
            code,
            detail: detail.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::InsufficientData(_) | ApiError::LowConfidence(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn generic_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::StoryFailed => "Failed to process story",
        ErrorCode::GraphFailed => "Failed to update story graph",
        ErrorCode::CharacterFailed => "Failed to process character",
        ErrorCode::AssistantFailed => "AI assistant request failed",
        ErrorCode::StyleFailed => "Style request failed",
        ErrorCode::UploadFailed => "Upload failed",
        _ => "Internal server error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            ApiError::Unauthorized => (ErrorCode::Unauthorized, "Unauthorized".to_string()),
            ApiError::NotFound => (ErrorCode::NotFound, "Not found".to_string()),
            ApiError::Validation(msg) => (ErrorCode::ValidationError, msg),
            ApiError::InsufficientData(msg) => (ErrorCode::InsufficientData, msg),
            ApiError::LowConfidence(msg) => (ErrorCode::LowConfidence, msg),
            ApiError::Internal { code, detail } => {
                tracing::error!(code = %code, error = %detail, "Request failed");
                (code, generic_message(code).to_string())
            }
        };

        (status, Json(ApiResponse::<()>::failure(code, message))).into_response()
    }
}

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::NotFound => ApiError::NotFound,
            StoryError::Repo(e) => ApiError::internal(ErrorCode::StoryFailed, e),
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound => ApiError::NotFound,
            GraphError::NodeNotFound
            | GraphError::DuplicateConnection
            | GraphError::AlreadyInteractive => ApiError::Validation(err.to_string()),
            GraphError::Repo(e) => ApiError::internal(ErrorCode::GraphFailed, e),
        }
    }
}

impl From<CharacterError> for ApiError {
    fn from(err: CharacterError) -> Self {
        match err {
            CharacterError::StoryNotFound => ApiError::NotFound,
            CharacterError::Repo(e) => ApiError::internal(ErrorCode::CharacterFailed, e),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidInput(msg) => ApiError::Validation(msg),
            AiError::StoryNotFound => ApiError::NotFound,
            other => ApiError::internal(ErrorCode::AssistantFailed, other),
        }
    }
}

impl From<StyleError> for ApiError {
    fn from(err: StyleError) -> Self {
        match err {
            StyleError::InsufficientData(msg) => ApiError::InsufficientData(msg),
            StyleError::LowConfidence(msg) => ApiError::LowConfidence(msg),
            StyleError::ProfileNotFound => ApiError::NotFound,
            other => ApiError::internal(ErrorCode::StyleFailed, other),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Blob(e) => ApiError::internal(ErrorCode::UploadFailed, e),
            other => ApiError::Validation(other.to_string()),
        }
    }
}
