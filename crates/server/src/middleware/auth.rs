//! Authentication and authorization extractors.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn list_users(
//!     State(state): State<AppState>,
//!     RequireAdmin(claims): RequireAdmin,
//! ) -> Result<Json<Vec<User>>> {
//!     // only administrators get here
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::UserRepository;
use crate::error::{AppError, FORBIDDEN_MESSAGE, set_sentry_user};
use crate::services::Claims;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// The `Authorization` header is split on whitespace and the second part is
/// verified as the token. The scheme word itself is not checked.
pub struct RequireAuth(pub Claims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = bearer_token(header).ok_or(AppError::Unauthorized)?;

        let claims = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized
        })?;

        set_sentry_user(&claims.email);
        Ok(Self(claims))
    }
}

/// Extractor that requires a valid bearer token belonging to an administrator.
///
/// Authenticates first, so the store is never consulted for anonymous
/// callers. A token whose email has no user, or whose user is not an
/// admin, is rejected with 403.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;

        let user = UserRepository::new(state.store())
            .get_by_email(&claims.email)
            .await?;
        if !user.is_some_and(|u| u.is_admin()) {
            tracing::info!(email = %claims.email, "Non-admin caller rejected");
            return Err(AppError::Forbidden(FORBIDDEN_MESSAGE));
        }

        Ok(Self(claims))
    }
}

/// Admin gate applied only when `FITLIFE_GATE_MUTATIONS` is on.
///
/// Holds `None` when gating is off.
pub struct GatedAdmin(pub Option<Claims>);

impl FromRequestParts<AppState> for GatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config().gate_mutations {
            return Ok(Self(None));
        }
        let RequireAdmin(claims) = RequireAdmin::from_request_parts(parts, state).await?;
        Ok(Self(Some(claims)))
    }
}

/// Authentication gate applied only when `FITLIFE_GATE_MUTATIONS` is on.
///
/// Holds `None` when gating is off.
pub struct GatedAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for GatedAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config().gate_mutations {
            return Ok(Self(None));
        }
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;
        Ok(Self(Some(claims)))
    }
}

/// The credential part of an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}
