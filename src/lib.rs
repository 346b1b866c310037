//! Stages guidebox titles into the local media catalog.
//!
//! - `guidebox`: cached, rate-limit aware API client
//! - `catalog`: diesel-backed catalog store and record factory
//! - `stage`: the staging run itself
pub mod catalog;
pub mod config;
pub mod error;
pub mod guidebox;
pub mod models;
pub mod schema;
pub mod stage;
