//! Settings import/export.
//!
//! GET  /api/v1/settings/export — download settings as a categorized JSON document
//! POST /api/v1/settings/import — upload a document; merge by default,
//!                                overwrite with `?override=true`
//!
//! The document format groups keys into `core_settings`, `viewer_settings`,
//! `loading_settings`, and `other_settings`, with an `_export_info` metadata
//! block. Import also accepts a flat key→value map for hand-written files.

use axum::{
    extract::{Extension, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use vitrine_common::error::{VitrineError, VitrineResult};
use vitrine_common::models::settings::{self, is_known_key};
use vitrine_db::repository::settings as settings_repo;

use crate::middleware::AuthContext;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings/export", get(export_settings))
        .route("/settings/import", post(import_settings))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

const CATEGORIES: &[&str] = &[
    "core_settings",
    "viewer_settings",
    "loading_settings",
    "other_settings",
];

/// Which document section a settings key belongs to.
fn category_for(key: &str) -> &'static str {
    match key {
        "asset_source" | "viewer_version" | "debug_logging" => "core_settings",
        "large_model_threshold_mb" | "large_model_handling" | "enable_ar" => "viewer_settings",
        k if k.starts_with("loading_") => "loading_settings",
        _ => "other_settings",
    }
}

// ============================================================
// Export
// ============================================================

async fn export_settings(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> VitrineResult<Json<Value>> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;

    let effective = super::settings::effective_settings(&state.db.pg).await?;

    let mut doc = serde_json::Map::new();
    for category in CATEGORIES {
        doc.insert(category.to_string(), json!({}));
    }
    for (key, value) in &effective {
        let section = doc
            .get_mut(category_for(key))
            .and_then(Value::as_object_mut)
            .expect("categories pre-inserted");
        section.insert(key.clone(), Value::String(value.clone()));
    }

    let config = vitrine_common::config::get();
    doc.insert(
        "_export_info".to_string(),
        json!({
            "exported_at": chrono::Utc::now().to_rfc3339(),
            "site": config.server.public_url,
            "version": env!("CARGO_PKG_VERSION"),
        }),
    );

    Ok(Json(Value::Object(doc)))
}

// ============================================================
// Import
// ============================================================

#[derive(Deserialize)]
struct ImportQuery {
    /// Overwrite existing stored values instead of merging around them.
    #[serde(default)]
    r#override: bool,
}

#[derive(Serialize)]
struct ImportResponse {
    imported: u64,
    skipped: u64,
}

/// Flatten a flat-or-categorized document into known (key, value) pairs.
/// Unknown keys and non-scalar values are dropped; `_export_info` is ignored.
fn flatten_document(doc: &Value) -> Vec<(String, String)> {
    let Some(root) = doc.as_object() else {
        return Vec::new();
    };

    let mut pairs: BTreeMap<String, String> = BTreeMap::new();
    let mut absorb = |map: &serde_json::Map<String, Value>| {
        for (key, value) in map {
            if !is_known_key(key) {
                continue;
            }
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            pairs.insert(key.clone(), text);
        }
    };

    let categorized = CATEGORIES.iter().any(|c| root.contains_key(*c));
    if categorized {
        for category in CATEGORIES {
            if let Some(section) = root.get(*category).and_then(Value::as_object) {
                absorb(section);
            }
        }
    } else {
        absorb(root);
    }

    pairs.into_iter().collect()
}

async fn import_settings(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    Json(doc): Json<Value>,
) -> VitrineResult<Json<ImportResponse>> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;

    let pairs = flatten_document(&doc);
    if pairs.is_empty() {
        return Err(VitrineError::Validation {
            message: "Document contains no recognized settings".into(),
        });
    }

    let mut imported = 0u64;
    let mut skipped = 0u64;
    let mut render_affecting = false;

    for (key, value) in &pairs {
        let written = if query.r#override {
            settings_repo::set(&state.db.pg, key, value).await?;
            true
        } else {
            settings_repo::set_if_absent(&state.db.pg, key, value).await?
        };

        if written {
            imported += 1;
            if settings::is_cache_relevant(key) {
                render_affecting = true;
            }
        } else {
            skipped += 1;
        }
    }

    if render_affecting {
        super::cache::flush_embed_cache(&state).await;
    }

    tracing::info!(imported, skipped, overwrite = query.r#override, "Settings imported");
    Ok(Json(ImportResponse { imported, skipped }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_key_has_a_category() {
        for &(key, _) in settings::SETTING_DEFAULTS {
            assert!(CATEGORIES.contains(&category_for(key)), "key: {key}");
        }
        assert_eq!(category_for("loading_theme_color"), "loading_settings");
        assert_eq!(category_for("cache_ttl_secs"), "other_settings");
    }

    #[test]
    fn flattens_flat_documents() {
        let doc = json!({
            "asset_source": "local",
            "large_model_threshold_mb": 32,
            "cache_enabled": false,
            "not_a_real_key": "x",
            "_export_info": {"version": "0.0.1"}
        });
        let pairs = flatten_document(&doc);
        assert!(pairs.contains(&("asset_source".into(), "local".into())));
        // scalars are stringified
        assert!(pairs.contains(&("large_model_threshold_mb".into(), "32".into())));
        assert!(pairs.contains(&("cache_enabled".into(), "false".into())));
        assert!(pairs.iter().all(|(k, _)| k != "not_a_real_key"));
    }

    #[test]
    fn flattens_categorized_documents() {
        let doc = json!({
            "core_settings": {"viewer_version": "3.4.0"},
            "viewer_settings": {"large_model_handling": "poster_button"},
            "loading_settings": {},
            "other_settings": {"cache_ttl_secs": "60"},
            "_export_info": {"site": "https://a.example"}
        });
        let pairs = flatten_document(&doc);
        assert_eq!(
            pairs,
            vec![
                ("cache_ttl_secs".to_string(), "60".to_string()),
                ("large_model_handling".to_string(), "poster_button".to_string()),
                ("viewer_version".to_string(), "3.4.0".to_string()),
            ]
        );
    }

    #[test]
    fn categorized_documents_ignore_stray_top_level_keys() {
        // Once any category section exists, top-level keys are not absorbed
        let doc = json!({
            "core_settings": {"viewer_version": "3.4.0"},
            "asset_source": "local"
        });
        let pairs = flatten_document(&doc);
        assert_eq!(pairs, vec![("viewer_version".to_string(), "3.4.0".to_string())]);
    }

    #[test]
    fn non_object_documents_flatten_to_nothing() {
        assert!(flatten_document(&json!("just a string")).is_empty());
        assert!(flatten_document(&json!([1, 2, 3])).is_empty());
    }
}
