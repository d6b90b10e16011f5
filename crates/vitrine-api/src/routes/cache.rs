//! Embed cache administration + shared invalidation helpers.
//!
//! POST /api/v1/cache/clear — flush every cached embed fragment
//!
//! Invalidation is synchronous: record saves and deletes call
//! [`invalidate_model`] before responding, settings changes call
//! [`flush_embed_cache`]. Redis being down never turns into a request error —
//! the cache self-heals via fingerprints and TTL.

use axum::{extract::State, middleware, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use vitrine_render::cache;

use crate::middleware::AuthContext;
use crate::AppState;
use axum::extract::Extension;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cache/clear", post(clear_cache))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct ClearCacheResponse {
    cleared: u64,
}

/// POST /api/v1/cache/clear — full flush of the embed cache.
async fn clear_cache(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearCacheResponse>, vitrine_common::error::VitrineError> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;
    let cleared = flush_embed_cache(&state).await;
    Ok(Json(ClearCacheResponse { cleared }))
}

/// Drop one model's cached fragment. Best-effort.
pub(crate) async fn invalidate_model(state: &AppState, model_id: i64) {
    if let Some(mut conn) = state.db.redis.clone() {
        if let Err(e) = vitrine_db::transients::del(&mut conn, &cache::cache_key(model_id)).await {
            tracing::warn!(model_id, error = %e, "Cache invalidation failed");
        }
    }
}

/// Drop every cached fragment. Best-effort; returns the number removed.
pub(crate) async fn flush_embed_cache(state: &AppState) -> u64 {
    if let Some(mut conn) = state.db.redis.clone() {
        match vitrine_db::transients::scan_del(&mut conn, &cache::cache_pattern()).await {
            Ok(count) => {
                tracing::info!(count, "Embed cache flushed");
                return count;
            }
            Err(e) => tracing::warn!(error = %e, "Embed cache flush failed"),
        }
    }
    0
}
