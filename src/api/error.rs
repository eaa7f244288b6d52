// src/api/error.rs
// =============================================================================
// Error taxonomy for talking to the hub.
//
// Every request ends in one of three ways when it fails:
// - Transport: the request could not be sent or the response not received
// - Http: the server answered with a non-2xx status (maybe with a message)
// - Decode: the body didn't have the shape its content type promised
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {})", .status.as_u16())]
    Http { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid server URL: {0}")]
    BaseUrl(String),
}

impl ApiError {
    // Builds an Http error from a status and the raw error body
    //
    // The hub sends {"error": "..."} for most failures. When that field is
    // missing (or the body isn't JSON at all) we fall back to a generic text.
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<super::types::ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

        ApiError::Http { status, message }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
