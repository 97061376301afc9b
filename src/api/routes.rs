//! API Routes
//!
//! Configures the Axum router with the form endpoints of both form kinds and
//! the operational endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, create_form, delete_form, edit_form, flush_cache_handler,
    health_handler, list_all_forms, list_user_forms, AppState, StoreFor,
};
use crate::forms::{FormRecord, OriginForm, RailFreightForm};

/// CRUD and list endpoints for one form kind, relative to its mount point.
///
/// - `POST /create` - Create a form (auth)
/// - `PUT /:id` - Edit an owned form (auth)
/// - `DELETE /:id` - Delete an owned form (auth)
/// - `GET /all` - Every form, cached
/// - `GET /user` - The caller's forms, cached (auth)
fn form_routes<F>() -> Router<AppState>
where
    F: FormRecord,
    AppState: StoreFor<F>,
{
    Router::new()
        .route("/create", post(create_form::<F>))
        .route("/all", get(list_all_forms::<F>))
        .route("/user", get(list_user_forms::<F>))
        .route("/:id", put(edit_form::<F>).delete(delete_form::<F>))
}

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `/api/origin/forms/*` - Origin charge forms
/// - `/api/railfreight/forms/*` - Rail freight forms
/// - `GET /cache/stats` - Cache statistics and per-key version metadata
/// - `POST /cache/flush` - Drop every cache entry (auth)
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/origin/forms", form_routes::<OriginForm>())
        .nest("/api/railfreight/forms", form_routes::<RailFreightForm>())
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/flush", post(flush_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
