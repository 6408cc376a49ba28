//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod token;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use fitlife_server::db::MEMORY_URL_SCHEME;

/// Errors shared by the subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The in-memory store has nothing to operate on.
    #[error("{0} needs a PostgreSQL database, not {MEMORY_URL_SCHEME}")]
    MemoryStore(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read the database URL the server would use.
pub fn database_url(command: &'static str) -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("FITLIFE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("FITLIFE_DATABASE_URL"))?;
    let url = SecretString::from(url);

    if url.expose_secret().starts_with(MEMORY_URL_SCHEME) {
        return Err(CommandError::MemoryStore(command));
    }
    Ok(url)
}
