//! Token minting for operators.
//!
//! # Environment Variables
//!
//! - `ACCESS_TOKEN_SECRET` - The secret the server signs with

use secrecy::SecretString;
use thiserror::Error;

use fitlife_core::{Email, EmailError};
use fitlife_server::services::{TokenError, TokenService};

use super::CommandError;

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Print a one hour token for `email` to stdout.
pub fn issue(email: &str) -> Result<(), IssueError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let secret = std::env::var("ACCESS_TOKEN_SECRET")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("ACCESS_TOKEN_SECRET"))?;

    let token = TokenService::new(&secret).issue_for(&email)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
