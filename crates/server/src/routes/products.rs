//! Product routes.

use axum::{
    Json,
    extract::{Path, State},
};
use fitlife_core::{InsertOneResult, Product};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store()).list_all().await?;
    Ok(Json(products))
}

/// List featured products, cheapest first.
#[instrument(skip(state))]
pub async fn best(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.store()).list_best().await?;
    Ok(Json(products))
}

/// One product, or `null` when no product has this id.
///
/// An id that is not a document identifier is a store error (500).
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Product>>> {
    let product = ProductRepository::new(state.store()).get_by_id(&id).await?;
    Ok(Json(product))
}

/// Add a product.
#[instrument(skip_all, fields(admin = %claims.email))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Json(product): Json<Product>,
) -> Result<Json<InsertOneResult>> {
    let ack = ProductRepository::new(state.store())
        .create(&product)
        .await?;
    tracing::info!(product_id = %ack.inserted_id, "Product created");
    Ok(Json(ack))
}
