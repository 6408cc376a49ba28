//! Services used by the route handlers.
//!
//! - `token` - Bearer token issuing and verification

pub mod token;

pub use token::{Claims, TokenError, TokenService};
