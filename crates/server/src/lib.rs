//! FitLifeNow HTTP API.
//!
//! Products, user registration and roles, and shopping carts over a
//! document store, with bearer-token gates on the private routes. The
//! binary in `main.rs` wires this library to configuration, logging and
//! Sentry; tests build the same router with [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
