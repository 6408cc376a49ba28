//! FitLifeNow Core - Shared document types.
//!
//! This crate provides the types shared by every FitLifeNow component:
//! - `server` - The HTTP API (products, users, carts)
//! - `cli` - Command-line tools for migrations and operator tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Documents keep unknown fields in a flattened map so the
//! API can relay whatever a client stored.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, emails, roles and statuses
//! - [`documents`] - Product, user and cart documents plus store acknowledgements

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod documents;
pub mod types;

pub use documents::*;
pub use types::*;
