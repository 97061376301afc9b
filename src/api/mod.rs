//! API Module
//!
//! HTTP handlers, bearer authentication and routing for the forms REST API.
//!
//! # Endpoints
//! - `/api/origin/forms/*` and `/api/railfreight/forms/*` - form CRUD and
//!   cached list reads
//! - `GET /cache/stats` - Cache statistics and version metadata
//! - `POST /cache/flush` - Flush the cache
//! - `GET /health` - Health check endpoint

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{AuthConfig, AuthUser, Claims};
pub use handlers::*;
pub use routes::create_router;
