//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                      - Liveness string
//! GET    /health                - Health check
//! GET    /health/ready          - Store connectivity check
//! POST   /jwt                   - Issue a bearer token
//!
//! # Products
//! GET    /products              - All products
//! GET    /products/best         - Featured products, cheapest first
//! GET    /products/{id}         - One product or null
//! POST   /products              - Add a product (admin)
//!
//! # Users
//! GET    /users?email=          - All users (admin, own email)
//! GET    /users/admin/{email}   - Whether the caller is an admin (auth)
//! POST   /users                 - Register
//! PATCH  /users/admin/{id}      - Promote to admin (gated)
//!
//! # Carts
//! GET    /carts/all?email=      - Every cart item (admin, own email)
//! GET    /carts?email=          - Own cart items (auth)
//! POST   /carts                 - Add a cart item (gated)
//! PATCH  /delivered/{id}        - Mark delivered (gated)
//! DELETE /carts/{id}            - Remove a cart item (gated)
//! ```
//!
//! "Gated" routes are open unless `FITLIFE_GATE_MUTATIONS` is set.

pub mod carts;
pub mod health;
pub mod products;
pub mod token;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::{AppError, FORBIDDEN_ACCESS};
use crate::services::Claims;
use crate::state::AppState;

/// `?email=` query used by the ownership-checked listings.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// Apply the ownership check.
    ///
    /// `Ok(None)` means no (or an empty) email was given and the route
    /// answers `[]`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the email is not the caller's.
    pub fn owned_by(self, claims: &Claims) -> Result<Option<String>, AppError> {
        match self.email.filter(|email| !email.is_empty()) {
            None => Ok(None),
            Some(email) if email == claims.email => Ok(Some(email)),
            Some(_) => Err(AppError::Forbidden(FORBIDDEN_ACCESS)),
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/best", get(products::best))
        .route("/{id}", get(products::show))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::register))
        // One path parameter: an email for GET, a document id for PATCH
        .route("/admin/{key}", get(users::check_admin).patch(users::promote))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(carts::index).post(carts::add))
        .route("/all", get(carts::all))
        .route("/{id}", delete(carts::remove))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/jwt", post(token::issue))
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .nest("/carts", cart_routes())
        .route("/delivered/{id}", patch(carts::deliver))
}

/// Build the application router over `state`, with permissive CORS.
///
/// Tracing, request-id and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes().layer(CorsLayer::permissive()).with_state(state)
}
