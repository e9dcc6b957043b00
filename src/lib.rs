#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Authentication (password hashing, access tokens, identity resolution), ownership-scoped"]
#![doc = "task access, the storage contract with its in-memory and PostgreSQL backends, and the"]
#![doc = "actix-web routes that expose them. Used by the main binary (`main.rs`)."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::error::AppError;
pub use crate::state::AppState;
