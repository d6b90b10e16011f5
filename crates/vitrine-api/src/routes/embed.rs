//! Public rendering surface.
//!
//! GET  /embed/{id} — rendered HTML fragment for one model
//! POST /render     — expand `[model id="N"]` shortcodes inside content
//!
//! These endpoints never fail outward: a bad id, a missing file, or a dead
//! cache all degrade to a literal fallback string or an uncached render.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use vitrine_common::models::model::ModelRecord;
use vitrine_common::models::settings::RenderSettings;
use vitrine_db::{repository::models, transients};
use vitrine_render::{attributes, cache, markup, probe, shortcode, transforms};

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/embed/{id}", get(embed_model))
        .route("/render", post(render_content))
}

// ============================================================
// GET /embed/{id}
// ============================================================

/// Render one model's embed fragment. Invalid or unknown ids produce the
/// literal fallback string with a 200 — never an error page inside someone's
/// layout.
async fn embed_model(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Html<String> {
    let Ok(model_id) = id.trim().parse::<i64>() else {
        return Html(markup::MODEL_NOT_FOUND.to_string());
    };

    let settings = match vitrine_db::repository::settings::load_snapshot(&state.db.pg).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load settings; rendering with defaults");
            RenderSettings::default()
        }
    };

    Html(render_embed(&state, &settings, model_id).await)
}

// ============================================================
// POST /render
// ============================================================

#[derive(Deserialize)]
struct RenderRequest {
    content: String,
}

#[derive(Serialize)]
struct RenderResponse {
    content: String,
}

/// Expand every shortcode in the submitted content. Expansion count is
/// capped by config; malformed shortcodes pass through verbatim.
async fn render_content(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RenderRequest>,
) -> Json<RenderResponse> {
    let cap = vitrine_common::config::get().limits.max_shortcodes_per_render;

    let settings = vitrine_db::repository::settings::load_snapshot(&state.db.pg)
        .await
        .unwrap_or_default();

    // Shortcode expansion is synchronous; rendering is not. Collect the ids
    // first, render each distinct model once, then substitute.
    let mut ids = Vec::new();
    shortcode::expand_shortcodes(&body.content, cap, |id| {
        ids.push(id);
        String::new()
    });

    let mut rendered: HashMap<i64, String> = HashMap::new();
    for id in ids {
        if !rendered.contains_key(&id) {
            let html = render_embed(&state, &settings, id).await;
            rendered.insert(id, html);
        }
    }

    let content = shortcode::expand_shortcodes(&body.content, cap, |id| {
        rendered
            .get(&id)
            .cloned()
            .unwrap_or_else(|| markup::MODEL_NOT_FOUND.to_string())
    });

    Json(RenderResponse { content })
}

// ============================================================
// Pipeline
// ============================================================

/// The full cached pipeline for one model: fingerprint → cache probe →
/// resolve + render on miss → best-effort store.
pub(crate) async fn render_embed(
    state: &AppState,
    settings: &RenderSettings,
    model_id: i64,
) -> String {
    let record = match models::find_by_id(&state.db.pg, model_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return markup::MODEL_NOT_FOUND.to_string(),
        Err(e) => {
            tracing::error!(model_id, error = %e, "Model lookup failed");
            return markup::MODEL_NOT_FOUND.to_string();
        }
    };

    let fingerprint = cache::Fingerprint::compute(
        record.id,
        env!("CARGO_PKG_VERSION"),
        &settings.cache_fingerprint_pairs(),
        record.updated_at,
    );

    // Cache probe — any failure is a miss
    if settings.cache_enabled {
        if let Some(mut conn) = state.db.redis.clone() {
            if let Ok(Some(raw)) = transients::get(&mut conn, &cache::cache_key(record.id)).await {
                if let Some(entry) = cache::CacheEntry::from_json(&raw) {
                    if entry.fingerprint == fingerprint {
                        tracing::debug!(model_id, "Embed cache hit");
                        return entry.markup;
                    }
                }
            }
        }
    }

    let html = render_uncached(state, settings, &record).await;

    if settings.cache_enabled {
        if let Some(mut conn) = state.db.redis.clone() {
            let entry = cache::CacheEntry::new(fingerprint, html.clone());
            if let Err(e) = transients::set_ex(
                &mut conn,
                &cache::cache_key(record.id),
                &entry.to_json(),
                settings.cache_ttl_secs,
            )
            .await
            {
                tracing::debug!(model_id, error = %e, "Embed cache store failed");
            }
        }
    }

    html
}

/// Resolve attributes, pick a template, and serialize markup.
async fn render_uncached(
    state: &AppState,
    settings: &RenderSettings,
    record: &ModelRecord,
) -> String {
    let local_size = match &record.storage_key {
        Some(key) => state.storage.file_size(key).await,
        None => None,
    };
    let file_size = probe::resolve_file_size(record, local_size, &state.prober).await;
    let defer = probe::should_defer_loading(record, settings, file_size);

    let chain = transforms::for_settings(settings);
    let attrs = attributes::resolve_attributes(record, settings, &chain);

    if defer {
        markup::render_deferred(record, settings, &attrs)
    } else {
        markup::render_standard(record, settings, &attrs)
    }
}
