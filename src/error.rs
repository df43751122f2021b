#[cfg(feature = "web")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::outcome::Attempt;

/// Main error type for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// I/O errors (socket binding, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or incomplete vote payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Voting is closed; carries the configured closed message
    #[error("{0}")]
    VotingClosed(String),

    /// Missing or wrong admin secret
    #[error("Forbidden: admin secret rejected")]
    AdminAuth,

    /// Every configured strategy failed for one vote item
    #[error("Upstream rejected vote {item_index} ({poll_id}/{option_id}) after {} attempts", .attempts.len())]
    UpstreamRejected {
        /// Position of the failing item in the request.
        item_index: usize,
        /// Poll of the failing item.
        poll_id: String,
        /// Option of the failing item.
        option_id: String,
        /// Every attempt, in the order tried.
        attempts: Vec<Attempt>,
    },

    /// A secret required for this operation was never configured
    #[error("Server misconfigured: {0}")]
    Misconfigured(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Standard error response format
#[derive(Serialize)]
#[derive(Debug)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,
    /// Error code (HTTP status code)
    pub code: u16,
    /// Error message
    pub message: String,
    /// Optional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::VotingClosed(_) | Self::AdminAuth => 403,
            Self::NotFound(_) => 404,
            Self::UpstreamRejected { .. } => 502,
            _ => 500,
        }
    }

    #[cfg(feature = "web")]
    /// Get the HTTP status code for this error as an axum status
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert the error to a JSON response
    pub fn to_json(&self) -> ErrorResponse {
        let details = match self {
            Self::UpstreamRejected {
                item_index,
                poll_id,
                option_id,
                attempts,
            } => Some(serde_json::json!({
                "itemIndex": item_index,
                "pollId": poll_id,
                "optionId": option_id,
                "attempts": attempts,
            })),
            _ => None,
        };

        ErrorResponse {
            ok: false,
            code: self.status(),
            message: self.to_string(),
            details,
        }
    }
}

#[cfg(feature = "web")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }

        (status, Json(self.to_json())).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Internal(format!("HTTP client error: {}", err))
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// A transport-level failure talking to the upstream (DNS, connect, timeout).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidInput("x".into()).status(), 400);
        assert_eq!(AppError::VotingClosed("closed".into()).status(), 403);
        assert_eq!(AppError::AdminAuth.status(), 403);
        assert_eq!(AppError::Misconfigured("key".into()).status(), 500);
        assert_eq!(AppError::NotFound("/x".into()).status(), 404);
    }

    #[test]
    fn test_upstream_rejected_carries_trace() {
        let err = AppError::UpstreamRejected {
            item_index: 1,
            poll_id: "P1".into(),
            option_id: "O1".into(),
            attempts: vec![Attempt {
                strategy_index: 0,
                strategy: "votes-object".into(),
                endpoint: "https://upstream/votes".into(),
                status: Some(422),
                body: "bad shape".into(),
            }],
        };

        let json = serde_json::to_value(err.to_json()).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["code"], 502);
        assert_eq!(json["details"]["itemIndex"], 1);
        assert_eq!(json["details"]["attempts"][0]["statusCode"], 422);
        assert_eq!(json["details"]["attempts"][0]["responseBody"], "bad shape");
    }

    #[test]
    fn test_plain_errors_omit_details() {
        let json = serde_json::to_value(AppError::AdminAuth.to_json()).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], 403);
    }
}
