//! Unified error handling with Sentry integration.
//!
//! Every failure a handler can produce maps to one JSON envelope
//! `{"error": true, "message": "..."}`. Server-side failures are captured to
//! Sentry before responding; their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::TokenError;

/// Message returned by the ownership check.
pub const FORBIDDEN_ACCESS: &str = "forbidden access";
/// Message returned by the admin gate.
pub const FORBIDDEN_MESSAGE: &str = "forbidden message";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, or expired bearer token.
    #[error("unauthorized access")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Token could not be issued.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Store(_) | Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Unauthorized => "unauthorized access",
            Self::Forbidden(message) => *message,
            Self::Store(_) | Self::Token(_) => "internal server error",
        };

        (status, Json(json!({ "error": true, "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the token's email claim.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use fitlife_core::DocumentIdError;
    use serde_json::Value;

    use super::*;

    async fn body(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let (status, json) = body(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, json!({ "error": true, "message": "unauthorized access" }));
    }

    #[tokio::test]
    async fn test_forbidden_envelopes() {
        let (status, json) = body(AppError::Forbidden(FORBIDDEN_MESSAGE)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["message"], "forbidden message");

        let (_, json) = body(AppError::Forbidden(FORBIDDEN_ACCESS)).await;
        assert_eq!(json["message"], "forbidden access");
    }

    #[tokio::test]
    async fn test_store_error_hides_details() {
        let err = AppError::Store(StoreError::InvalidId(DocumentIdError("123".to_owned())));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": true, "message": "internal server error" }));
    }
}
