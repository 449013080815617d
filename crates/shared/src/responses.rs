//! Response envelope and error codes
//!
//! Every JSON route answers with either
//! `{"success":true,"data":...}` or
//! `{"success":false,"error":"<message>","code":"<ERROR_CODE>"}`.

use serde::{Deserialize, Serialize};

use inkworld_domain::LibraryEntry;

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success {
        success: bool,
        data: T,
    },
    Failure {
        success: bool,
        error: String,
        code: ErrorCode,
    },
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Success {
            success: true,
            data,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiResponse::Failure {
            success: false,
            error: message.into(),
            code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
///
/// HTTP status mapping is an adapter concern and lives with the engine's
/// `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // === Client Errors ===
    /// No session, or an expired one
    Unauthorized,
    /// Missing, or not owned by the caller (deliberately conflated)
    NotFound,
    /// Body failed schema rules or a business rule
    ValidationError,
    /// Not enough writing to build a style profile
    InsufficientData,
    /// Style profile exists but is below the generation floor
    LowConfidence,

    // === Server Errors (per subsystem catch-alls) ===
    StoryFailed,
    GraphFailed,
    CharacterFailed,
    AssistantFailed,
    StyleFailed,
    UploadFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientData => "INSUFFICIENT_DATA",
            ErrorCode::LowConfidence => "LOW_CONFIDENCE",
            ErrorCode::StoryFailed => "STORY_FAILED",
            ErrorCode::GraphFailed => "GRAPH_FAILED",
            ErrorCode::CharacterFailed => "CHARACTER_FAILED",
            ErrorCode::AssistantFailed => "ASSISTANT_FAILED",
            ErrorCode::StyleFailed => "STYLE_FAILED",
            ErrorCode::UploadFailed => "UPLOAD_FAILED",
        }
    }

    /// Catch-all codes whose details are logged, never returned.
    pub fn is_server_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::StoryFailed
                | ErrorCode::GraphFailed
                | ErrorCode::CharacterFailed
                | ErrorCode::AssistantFailed
                | ErrorCode::StyleFailed
                | ErrorCode::UploadFailed
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Library listing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u32) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPage {
    pub stories: Vec<LibraryEntry>,
    pub pagination: Pagination,
}
