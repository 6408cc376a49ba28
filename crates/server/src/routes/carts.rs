//! Cart routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use fitlife_core::{CartItem, CartStatus, DeleteResult, Email, UpdateResult};
use serde_json::json;
use tracing::instrument;

use super::EmailQuery;
use crate::db::{CartRepository, InsertOutcome};
use crate::error::{AppError, FORBIDDEN_ACCESS, Result};
use crate::middleware::{GatedAdmin, GatedAuth, RequireAdmin, RequireAuth};
use crate::state::AppState;

/// Every cart item. Admin only, and `?email=` must be the caller's own.
#[instrument(skip_all, fields(admin = %claims.email))]
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<CartItem>>> {
    if query.owned_by(&claims)?.is_none() {
        return Ok(Json(Vec::new()));
    }
    let items = CartRepository::new(state.store()).list_all().await?;
    Ok(Json(items))
}

/// The caller's own cart items.
#[instrument(skip_all, fields(email = %claims.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<CartItem>>> {
    let Some(email) = query.owned_by(&claims)? else {
        return Ok(Json(Vec::new()));
    };
    let items = CartRepository::new(state.store())
        .list_by_email(&email)
        .await?;
    Ok(Json(items))
}

/// Add a cart item, once per product.
///
/// With mutation gating on, the item must be owned by the caller.
#[instrument(skip_all, fields(product_id = ?item.product_id))]
pub async fn add(
    State(state): State<AppState>,
    GatedAuth(claims): GatedAuth,
    Json(mut item): Json<CartItem>,
) -> Result<Response> {
    if let Some(claims) = claims
        && item.email.as_ref().map(Email::as_str) != Some(claims.email.as_str())
    {
        return Err(AppError::Forbidden(FORBIDDEN_ACCESS));
    }
    item.id = None;

    match CartRepository::new(state.store()).add(&item).await? {
        InsertOutcome::Inserted(ack) => {
            tracing::info!(cart_id = %ack.inserted_id, "Cart item added");
            Ok(Json(ack).into_response())
        }
        InsertOutcome::Duplicate => {
            Ok(Json(json!({ "message": "cart already exists" })).into_response())
        }
    }
}

/// Mark a cart item delivered.
#[instrument(skip_all, fields(cart_id = %id))]
pub async fn deliver(
    State(state): State<AppState>,
    GatedAdmin(_claims): GatedAdmin,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>> {
    let result = CartRepository::new(state.store())
        .set_status(&id, CartStatus::Delivered)
        .await?;
    Ok(Json(result))
}

/// Remove a cart item.
#[instrument(skip_all, fields(cart_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    GatedAuth(_claims): GatedAuth,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>> {
    let result = CartRepository::new(state.store()).delete(&id).await?;
    Ok(Json(result))
}
