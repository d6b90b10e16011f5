//! Model record — the stored configuration + file reference for one 3D asset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================
// Viewer size presets
// ============================================================

/// Named viewer size. Presets map to fixed (width, height) pairs; `Custom`
/// defers to the record's explicit width/height fields. Unknown values parse
/// as `Custom` so stale rows keep rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerSize {
    Small,
    Medium,
    Large,
    Full,
    Custom,
}

impl ViewerSize {
    pub fn parse(s: &str) -> Self {
        match s {
            "small" => Self::Small,
            "medium" => Self::Medium,
            "large" => Self::Large,
            "full" => Self::Full,
            _ => Self::Custom,
        }
    }

    /// Fixed (width, height) for preset sizes; None for `Custom`.
    pub fn preset_dimensions(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Small => Some(("300px", "300px")),
            Self::Medium => Some(("500px", "500px")),
            Self::Large => Some(("800px", "600px")),
            Self::Full => Some(("98vw", "98vh")),
            Self::Custom => None,
        }
    }
}

// ============================================================
// Model record
// ============================================================

/// Row in the `models` table. One per uploaded 3D model.
///
/// Display fields are deliberately stringly-typed (CSS units, model-viewer
/// attribute values) — the attribute resolver owns defaulting and
/// normalization, not the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ModelRecord {
    pub id: i64,
    pub name: String,
    pub alt_text: Option<String>,

    /// Absolute URL of the model binary (glb/gltf/usdz).
    pub file_url: String,
    /// Storage key when the binary lives in Vitrine's local storage;
    /// None for externally hosted models.
    pub storage_key: Option<String>,
    /// Size in bytes, recorded at upload time when known.
    pub file_size: Option<i64>,

    pub poster_url: Option<String>,

    /// `small` | `medium` | `large` | `full` | `custom`
    pub viewer_size: String,
    pub custom_width: Option<String>,
    pub custom_height: Option<String>,
    pub tablet_width: Option<String>,
    pub tablet_height: Option<String>,
    pub mobile_width: Option<String>,
    pub mobile_height: Option<String>,

    pub camera_controls: bool,
    pub disable_pan: bool,
    pub disable_tap: bool,
    pub disable_zoom: bool,
    pub touch_action: Option<String>,
    pub orbit_sensitivity: Option<String>,

    pub auto_rotate: bool,
    pub auto_rotate_delay: Option<String>,
    pub rotation_speed: Option<String>,

    pub camera_orbit: Option<String>,
    pub camera_target: Option<String>,
    pub field_of_view: Option<String>,
    pub min_field_of_view: Option<String>,
    pub max_field_of_view: Option<String>,
    pub min_camera_orbit: Option<String>,
    pub max_camera_orbit: Option<String>,

    pub interaction_prompt: Option<String>,
    pub interaction_prompt_style: Option<String>,
    pub interaction_prompt_threshold: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================
// Requests
// ============================================================

/// Update request — a full overwrite of the display configuration.
/// Fields omitted from the request keep their column defaults, not their
/// previous values, matching an edit-form save.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModelRequest {
    #[validate(length(min = 1, max = 200, message = "Model name must be 1-200 characters"))]
    pub name: String,
    pub alt_text: Option<String>,
    pub poster_url: Option<String>,

    #[serde(default = "default_viewer_size")]
    pub viewer_size: String,
    pub custom_width: Option<String>,
    pub custom_height: Option<String>,
    pub tablet_width: Option<String>,
    pub tablet_height: Option<String>,
    pub mobile_width: Option<String>,
    pub mobile_height: Option<String>,

    #[serde(default = "default_true")]
    pub camera_controls: bool,
    #[serde(default)]
    pub disable_pan: bool,
    #[serde(default)]
    pub disable_tap: bool,
    #[serde(default)]
    pub disable_zoom: bool,
    pub touch_action: Option<String>,
    pub orbit_sensitivity: Option<String>,

    #[serde(default)]
    pub auto_rotate: bool,
    pub auto_rotate_delay: Option<String>,
    pub rotation_speed: Option<String>,

    pub camera_orbit: Option<String>,
    pub camera_target: Option<String>,
    pub field_of_view: Option<String>,
    pub min_field_of_view: Option<String>,
    pub max_field_of_view: Option<String>,
    pub min_camera_orbit: Option<String>,
    pub max_camera_orbit: Option<String>,

    pub interaction_prompt: Option<String>,
    pub interaction_prompt_style: Option<String>,
    pub interaction_prompt_threshold: Option<String>,
}

fn default_viewer_size() -> String {
    "medium".into()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_map_to_fixed_dimensions() {
        assert_eq!(ViewerSize::parse("small").preset_dimensions(), Some(("300px", "300px")));
        assert_eq!(ViewerSize::parse("medium").preset_dimensions(), Some(("500px", "500px")));
        assert_eq!(ViewerSize::parse("large").preset_dimensions(), Some(("800px", "600px")));
        assert_eq!(ViewerSize::parse("full").preset_dimensions(), Some(("98vw", "98vh")));
    }

    #[test]
    fn unknown_size_falls_through_to_custom() {
        assert_eq!(ViewerSize::parse("custom"), ViewerSize::Custom);
        assert_eq!(ViewerSize::parse("enormous"), ViewerSize::Custom);
        assert_eq!(ViewerSize::parse(""), ViewerSize::Custom);
        assert!(ViewerSize::Custom.preset_dimensions().is_none());
    }
}
