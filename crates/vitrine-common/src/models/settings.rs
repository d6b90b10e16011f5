//! Render settings — the singleton site-wide options that shape embed output.
//!
//! Settings are stored as key/value rows and snapshotted into an immutable
//! [`RenderSettings`] per request. The attribute resolver and markup renderer
//! only ever see the snapshot — no ambient lookups mid-pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys recognized by the settings store, with their defaults.
/// Unknown keys are rejected at the API boundary.
pub const SETTING_DEFAULTS: &[(&str, &str)] = &[
    ("asset_source", "cdn"),
    ("viewer_version", "3.3.0"),
    ("large_model_threshold_mb", "16"),
    ("large_model_handling", "direct"),
    ("loading_theme_color", "#1e88e5"),
    ("loading_bar_position", "middle"),
    ("loading_font", ""),
    ("enable_ar", "false"),
    ("debug_logging", "false"),
    ("cache_ttl_secs", "43200"),
    ("cache_enabled", "true"),
];

/// Settings keys that affect rendered markup. These feed the cache
/// fingerprint, and only their updates trigger cache invalidation.
/// `debug_logging` is deliberately absent.
pub const CACHE_ALLOWLIST: &[&str] = &[
    "asset_source",
    "viewer_version",
    "large_model_threshold_mb",
    "large_model_handling",
    "loading_theme_color",
    "loading_bar_position",
    "loading_font",
    "enable_ar",
];

/// How models above the size threshold are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LargeModelHandling {
    /// Render the viewer inline regardless of size.
    Direct,
    /// Defer loading behind a poster + load button (requires a poster).
    PosterButton,
}

/// Immutable per-request snapshot of the site-wide render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub asset_source: String,
    pub viewer_version: String,
    pub large_model_threshold_mb: u64,
    pub large_model_handling: String,
    pub loading_theme_color: String,
    pub loading_bar_position: String,
    pub loading_font: String,
    /// Capability flag: emit AR attributes via the transformer chain.
    pub enable_ar: bool,
    pub debug_logging: bool,
    pub cache_ttl_secs: u64,
    pub cache_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_rows(&BTreeMap::new())
    }
}

impl RenderSettings {
    /// Build a snapshot from stored key/value rows, falling back to defaults
    /// for anything absent or unparseable.
    pub fn from_rows(rows: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| -> String {
            rows.get(key)
                .cloned()
                .unwrap_or_else(|| default_for(key).to_string())
        };

        Self {
            asset_source: get("asset_source"),
            viewer_version: get("viewer_version"),
            large_model_threshold_mb: get("large_model_threshold_mb")
                .parse()
                .unwrap_or(16),
            large_model_handling: get("large_model_handling"),
            loading_theme_color: get("loading_theme_color"),
            loading_bar_position: get("loading_bar_position"),
            loading_font: get("loading_font"),
            enable_ar: get("enable_ar") == "true",
            debug_logging: get("debug_logging") == "true",
            cache_ttl_secs: get("cache_ttl_secs").parse().unwrap_or(43_200),
            cache_enabled: get("cache_enabled") != "false",
        }
    }

    pub fn large_model_handling(&self) -> LargeModelHandling {
        match self.large_model_handling.as_str() {
            "poster_button" => LargeModelHandling::PosterButton,
            _ => LargeModelHandling::Direct,
        }
    }

    /// The (key, value) pairs that participate in the cache fingerprint,
    /// in allowlist order.
    pub fn cache_fingerprint_pairs(&self) -> Vec<(&'static str, String)> {
        CACHE_ALLOWLIST
            .iter()
            .map(|&key| {
                let value = match key {
                    "asset_source" => self.asset_source.clone(),
                    "viewer_version" => self.viewer_version.clone(),
                    "large_model_threshold_mb" => self.large_model_threshold_mb.to_string(),
                    "large_model_handling" => self.large_model_handling.clone(),
                    "loading_theme_color" => self.loading_theme_color.clone(),
                    "loading_bar_position" => self.loading_bar_position.clone(),
                    "loading_font" => self.loading_font.clone(),
                    "enable_ar" => self.enable_ar.to_string(),
                    _ => unreachable!("allowlist key without accessor: {key}"),
                };
                (key, value)
            })
            .collect()
    }
}

/// Look up the default for a known key ("" for unknown).
pub fn default_for(key: &str) -> &'static str {
    SETTING_DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

/// Whether a key is part of the recognized settings schema.
pub fn is_known_key(key: &str) -> bool {
    SETTING_DEFAULTS.iter().any(|(k, _)| *k == key)
}

/// Whether a key affects rendered markup (and therefore the cache).
pub fn is_cache_relevant(key: &str) -> bool {
    CACHE_ALLOWLIST.contains(&key)
}
