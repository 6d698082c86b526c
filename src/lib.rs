//! The `tasknest` library crate.
//!
//! Core business logic for the TaskNest API: configuration, error handling,
//! authentication (tokens, password hashing, the access guard middleware),
//! domain models, and the HTTP route handlers. The binary (`main.rs`) only
//! assembles these into a running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
