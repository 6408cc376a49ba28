//! Token issuing route.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Response of `POST /jwt`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Sign the submitted claims.
///
/// The body is not validated: a token minted without an `email` claim is
/// simply rejected by every gated route later.
#[instrument(skip_all)]
pub async fn issue(
    State(state): State<AppState>,
    Json(claims): Json<Map<String, Value>>,
) -> Result<Json<TokenResponse>> {
    let token = state.tokens().issue(claims)?;
    Ok(Json(TokenResponse { token }))
}
