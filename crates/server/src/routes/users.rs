//! User routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use fitlife_core::{Role, UpdateResult, User};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::EmailQuery;
use crate::db::{InsertOutcome, UserRepository};
use crate::error::Result;
use crate::middleware::{GatedAdmin, RequireAdmin, RequireAuth};
use crate::state::AppState;

/// Response of `GET /users/admin/{email}`.
#[derive(Debug, Serialize)]
pub struct AdminCheck {
    pub admin: bool,
}

/// List every user. Admin only, and `?email=` must be the caller's own.
#[instrument(skip_all, fields(admin = %claims.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<User>>> {
    if query.owned_by(&claims)?.is_none() {
        return Ok(Json(Vec::new()));
    }
    let users = UserRepository::new(state.store()).list_all().await?;
    Ok(Json(users))
}

/// Whether `email` belongs to an administrator.
///
/// Callers may only ask about themselves; any other email answers
/// `{admin: false}` without a lookup.
#[instrument(skip_all, fields(email = %email))]
pub async fn check_admin(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Path(email): Path<String>,
) -> Result<Json<AdminCheck>> {
    if claims.email != email {
        return Ok(Json(AdminCheck { admin: false }));
    }
    let user = UserRepository::new(state.store())
        .get_by_email(&email)
        .await?;
    Ok(Json(AdminCheck {
        admin: user.is_some_and(|u| u.is_admin()),
    }))
}

/// Register a user, once per email.
///
/// With mutation gating on, a submitted `role` is discarded so nobody can
/// register straight into the admin role.
#[instrument(skip_all, fields(email = %user.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut user): Json<User>,
) -> Result<Response> {
    if state.config().gate_mutations {
        user.role = None;
    }
    user.id = None;

    match UserRepository::new(state.store()).register(&user).await? {
        InsertOutcome::Inserted(ack) => {
            tracing::info!(user_id = %ack.inserted_id, "User registered");
            Ok(Json(ack).into_response())
        }
        InsertOutcome::Duplicate => {
            Ok(Json(json!({ "message": "user already exists" })).into_response())
        }
    }
}

/// Grant the admin role to the user with this id.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn promote(
    State(state): State<AppState>,
    GatedAdmin(_claims): GatedAdmin,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>> {
    let result = UserRepository::new(state.store())
        .set_role(&id, Role::Admin)
        .await?;
    tracing::info!(
        matched = result.matched_count,
        modified = result.modified_count,
        "Promote to admin"
    );
    Ok(Json(result))
}
