//! Error types for the data-access layer.

use thiserror::Error;

use crate::model::DocumentKind;

/// Errors returned by [`crate::api::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered outside the 2xx range.
    #[error("server error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A mock-backed document does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: DocumentKind, id: i64 },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
