//! Query and gateway error types.
//!
//! Every query failure is answered with a bare status code and an empty
//! body. The detail only goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;
use thiserror::Error;

use super::config::ConfigError;

/// Per-request failure of `GET /api/search`
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid substringLength {0:?}")]
    InvalidSubstringLength(String),

    #[error("request body missing or empty")]
    MissingBody,

    #[error("request body of {declared} bytes exceeds limit of {max}")]
    BodyTooLarge { declared: u64, max: usize },

    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body is not valid UTF-8")]
    InvalidEncoding,

    #[error("scan deadline exceeded after {tested} candidates")]
    Timeout { tested: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::InvalidSubstringLength(_)
            | QueryError::MissingBody
            | QueryError::ShortRead { .. }
            | QueryError::BodyRead(_)
            | QueryError::InvalidEncoding => StatusCode::BAD_REQUEST,
            QueryError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            QueryError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            QueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are the caller's fault; the rest are ours
    pub fn is_rejection(&self) -> bool {
        self.status().is_client_error() && !matches!(self, QueryError::Timeout { .. })
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "search request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "search request rejected");
        }
        status.into_response()
    }
}

/// Gateway lifecycle errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
