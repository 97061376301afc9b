//! Freight Forms - cached CRUD service for freight quote forms
//!
//! Origin charge and rail freight quote forms are stored in a store of
//! record and their list reads are fronted by a versioned TTL cache with
//! staleness checks and retried writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
