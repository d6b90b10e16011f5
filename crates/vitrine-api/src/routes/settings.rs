//! Settings routes.
//!
//! GET   /api/v1/settings — effective settings (stored values over defaults)
//! PATCH /api/v1/settings — partial key→value update
//!
//! Updating any render-affecting key triggers a synchronous full flush of the
//! embed cache before the response goes out.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Json, Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use vitrine_common::error::{VitrineError, VitrineResult};
use vitrine_common::models::settings::{self, SETTING_DEFAULTS};
use vitrine_db::repository::settings as settings_repo;

use crate::middleware::AuthContext;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings", get(get_settings).patch(update_settings))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// Effective settings: defaults overlaid with stored rows.
pub(crate) async fn effective_settings(
    pool: &sqlx::PgPool,
) -> Result<BTreeMap<String, String>, sqlx::Error> {
    let stored = settings_repo::load_all(pool).await?;
    let mut merged: BTreeMap<String, String> = SETTING_DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    merged.extend(stored);
    Ok(merged)
}

async fn get_settings(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> VitrineResult<Json<BTreeMap<String, String>>> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;
    Ok(Json(effective_settings(&state.db.pg).await?))
}

/// PATCH /api/v1/settings — upsert the submitted keys. Unknown keys are
/// rejected outright so typos don't silently become dead rows.
async fn update_settings(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BTreeMap<String, String>>,
) -> VitrineResult<Json<BTreeMap<String, String>>> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;

    if body.is_empty() {
        return Err(VitrineError::Validation {
            message: "No settings submitted".into(),
        });
    }

    for key in body.keys() {
        if !settings::is_known_key(key) {
            return Err(VitrineError::Validation {
                message: format!("Unknown setting '{key}'"),
            });
        }
    }

    let mut render_affecting = false;
    for (key, value) in &body {
        settings_repo::set(&state.db.pg, key, value).await?;
        if settings::is_cache_relevant(key) {
            render_affecting = true;
        }
    }

    if render_affecting {
        super::cache::flush_embed_cache(&state).await;
    }

    Ok(Json(effective_settings(&state.db.pg).await?))
}
