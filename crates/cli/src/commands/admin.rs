//! Administrator bootstrap.
//!
//! The HTTP promote route needs the target's document id and, when
//! mutations are gated, an existing admin. This command grants the role by
//! email directly in the database, which is how the first admin is made.
//!
//! # Usage
//!
//! ```bash
//! fitlife-cli admin promote -e coach@fitlifenow.com
//! ```

use thiserror::Error;

use fitlife_core::{Email, EmailError, Role};
use fitlife_server::db::{PgDocumentStore, StoreError, UserRepository, create_pool};

use super::{CommandError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No user registered with this email.
    #[error("No user registered with email: {0}")]
    UserNotFound(String),
}

/// Grant the admin role to the user registered as `email`.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let url = database_url("admin promote")?;

    tracing::info!("Connecting to database...");
    let store = PgDocumentStore::new(create_pool(&url).await?);

    let result = UserRepository::new(&store)
        .set_role_by_email(&email, Role::Admin)
        .await?;

    if result.matched_count == 0 {
        return Err(AdminError::UserNotFound(email.into_inner()));
    }
    if result.modified_count == 0 {
        tracing::info!("{} is already an admin", email);
    } else {
        tracing::info!("{} promoted to admin", email);
    }
    Ok(())
}
