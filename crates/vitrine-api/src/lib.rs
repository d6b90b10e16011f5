//! # vitrine-api
//!
//! REST API layer for Vitrine. Public embed/render endpoints plus the
//! authenticated management surface (uploads, model CRUD, settings,
//! import/export, cache admin, diagnostics).

pub mod auth;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use vitrine_db::{storage::Storage, Database};
use vitrine_render::probe::Prober;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Local file storage for uploaded model binaries.
    pub storage: Storage,
    /// HTTP HEAD prober for remote large-file detection.
    pub prober: Prober,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::models::router())
        .merge(routes::uploads::router())
        .merge(routes::settings::router())
        .merge(routes::transfer::router())
        .merge(routes::cache::router())
        .merge(routes::diagnostics::router());

    Router::new()
        .nest("/api/v1", api_routes)
        // Public rendering surface lives outside /api/v1
        .merge(routes::embed::router())
        .merge(routes::files::router())
        .merge(routes::health::router())
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
