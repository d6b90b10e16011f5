//! Attribute resolution — from a model record + settings snapshot to the
//! ordered attribute map of the `<model-viewer>` element.
//!
//! The resolver is a pure function: same record + same settings = the same
//! map, byte for byte. Missing or blank optional fields are omitted entirely;
//! flags are entries with an empty value and serialize as bare attribute
//! names.

use vitrine_common::models::model::{ModelRecord, ViewerSize};
use vitrine_common::models::settings::RenderSettings;

// ============================================================
// Attribute map
// ============================================================

/// Ordered string→string map mirroring the HTML attributes of the viewer
/// element. `set` overwrites in place when the name already exists (keeping
/// its original position) and appends otherwise, so later writers win on
/// value while iteration order stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a valued attribute. Overwrites any existing entry with this name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Set a boolean flag attribute (serializes as a bare name).
    pub fn set_flag(&mut self, name: &str) {
        self.set(name, "");
    }

    /// Remove an attribute (used by transformers).
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A pluggable attribute transformer. Transformers run in order after all
/// built-in resolution, so anything they set wins over built-ins.
///
/// Contract: pure map-in/map-out mutation — no I/O, no ambient state.
pub type AttributeTransform = Box<dyn Fn(&mut AttributeMap) + Send + Sync>;

// ============================================================
// Resolution
// ============================================================

/// Resolved display size for a record.
///
/// Preset sizes win outright; only `custom` (or an unrecognized value)
/// consults the explicit width/height fields, which default independently.
pub fn resolve_size(record: &ModelRecord) -> (String, String) {
    if let Some((w, h)) = ViewerSize::parse(&record.viewer_size).preset_dimensions() {
        return (w.to_string(), h.to_string());
    }

    let width = non_blank(&record.custom_width).unwrap_or("100%").to_string();
    let height = non_blank(&record.custom_height).unwrap_or("500px").to_string();
    (width, height)
}

/// Append a `deg` unit to bare numeric rotation speeds. Values that already
/// carry a unit pass through untouched.
pub fn normalize_rotation_speed(value: &str) -> String {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        format!("{trimmed}deg")
    } else {
        trimmed.to_string()
    }
}

/// Build the complete attribute map for one model.
///
/// Resolution order matters: later entries can overwrite earlier ones, and
/// the transformer chain runs last so external attributes always win.
pub fn resolve_attributes(
    record: &ModelRecord,
    settings: &RenderSettings,
    transforms: &[AttributeTransform],
) -> AttributeMap {
    let mut map = AttributeMap::new();

    // 1. Mandatory: src, alt, style
    map.set("src", record.file_url.trim());

    let alt = match non_blank(&record.alt_text) {
        Some(alt) => alt.to_string(),
        None => format!("{} 3D Model", record.name),
    };
    map.set("alt", alt);

    let (width, height) = resolve_size(record);
    let mut style = format!("width: {width}; height: {height};");
    if !settings.loading_theme_color.trim().is_empty() {
        // model-viewer reads its loading bar color from this CSS variable
        style.push_str(&format!(
            " --progress-bar-color: {};",
            settings.loading_theme_color.trim()
        ));
    }
    map.set("style", style);

    // 2. Poster
    if let Some(poster) = non_blank(&record.poster_url) {
        map.set("poster", poster);
    }

    // 3. Interaction
    if record.camera_controls {
        map.set_flag("camera-controls");
    }
    if record.disable_pan {
        map.set_flag("disable-pan");
    }
    if record.disable_tap {
        map.set_flag("disable-tap");
    }
    if record.disable_zoom {
        map.set_flag("disable-zoom");
    }
    if let Some(touch) = non_blank(&record.touch_action) {
        map.set("touch-action", touch);
    }
    if let Some(sensitivity) = non_blank(&record.orbit_sensitivity) {
        map.set("orbit-sensitivity", sensitivity);
    }

    // 4. Auto-rotate block
    if record.auto_rotate {
        map.set_flag("auto-rotate");
        let delay = non_blank(&record.auto_rotate_delay).unwrap_or("5000");
        map.set("auto-rotate-delay", delay);
        let speed = non_blank(&record.rotation_speed).unwrap_or("30deg");
        map.set("rotation-per-second", normalize_rotation_speed(speed));
    }

    // 5. Camera bounds
    for (name, value) in [
        ("camera-orbit", &record.camera_orbit),
        ("camera-target", &record.camera_target),
        ("field-of-view", &record.field_of_view),
        ("min-field-of-view", &record.min_field_of_view),
        ("max-field-of-view", &record.max_field_of_view),
        ("min-camera-orbit", &record.min_camera_orbit),
        ("max-camera-orbit", &record.max_camera_orbit),
    ] {
        if let Some(v) = non_blank(value) {
            map.set(name, v);
        }
    }

    // 6. Interaction prompt hints
    if let Some(prompt) = non_blank(&record.interaction_prompt) {
        map.set("interaction-prompt", prompt);
    }
    if let Some(style) = non_blank(&record.interaction_prompt_style) {
        map.set("interaction-prompt-style", style);
    }
    if let Some(threshold) = non_blank(&record.interaction_prompt_threshold) {
        map.set("interaction-prompt-threshold", threshold);
    }

    // 7. Transformer chain — external attributes win
    for transform in transforms {
        transform(&mut map);
    }

    map
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bare_record() -> ModelRecord {
        ModelRecord {
            id: 42,
            name: "Walnut Chair".to_string(),
            alt_text: None,
            file_url: "https://site/x.glb".to_string(),
            storage_key: None,
            file_size: None,
            poster_url: None,
            viewer_size: "medium".to_string(),
            custom_width: None,
            custom_height: None,
            tablet_width: None,
            tablet_height: None,
            mobile_width: None,
            mobile_height: None,
            camera_controls: true,
            disable_pan: false,
            disable_tap: false,
            disable_zoom: false,
            touch_action: None,
            orbit_sensitivity: None,
            auto_rotate: false,
            auto_rotate_delay: None,
            rotation_speed: None,
            camera_orbit: None,
            camera_target: None,
            field_of_view: None,
            min_field_of_view: None,
            max_field_of_view: None,
            min_camera_orbit: None,
            max_camera_orbit: None,
            interaction_prompt: None,
            interaction_prompt_style: None,
            interaction_prompt_threshold: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn presets_override_custom_dimensions() {
        let mut record = bare_record();
        record.viewer_size = "large".to_string();
        record.custom_width = Some("1234px".to_string());
        record.custom_height = Some("777px".to_string());
        assert_eq!(resolve_size(&record), ("800px".to_string(), "600px".to_string()));
    }

    #[test]
    fn custom_size_defaults_when_blank() {
        let mut record = bare_record();
        record.viewer_size = "custom".to_string();
        assert_eq!(resolve_size(&record), ("100%".to_string(), "500px".to_string()));

        record.custom_width = Some("  ".to_string());
        record.custom_height = Some("640px".to_string());
        assert_eq!(resolve_size(&record), ("100%".to_string(), "640px".to_string()));
    }

    #[test]
    fn medium_preset_resolves_to_500px_style() {
        let record = bare_record();
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        let style = map.get("style").unwrap();
        assert!(style.contains("width: 500px; height: 500px;"), "style was: {style}");
        assert_eq!(map.get("src"), Some("https://site/x.glb"));
    }

    #[test]
    fn loading_theme_color_flows_into_style() {
        let record = bare_record();
        let mut settings = RenderSettings::default();
        settings.loading_theme_color = "#ff8800".to_string();
        let map = resolve_attributes(&record, &settings, &[]);
        assert!(map.get("style").unwrap().contains("--progress-bar-color: #ff8800;"));

        settings.loading_theme_color = String::new();
        let map = resolve_attributes(&record, &settings, &[]);
        assert!(!map.get("style").unwrap().contains("--progress-bar-color"));
    }

    #[test]
    fn blank_alt_text_defaults_to_name() {
        let record = bare_record();
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        assert_eq!(map.get("alt"), Some("Walnut Chair 3D Model"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut record = bare_record();
        record.auto_rotate = true;
        record.poster_url = Some("https://site/p.webp".to_string());
        record.camera_orbit = Some("45deg 60deg 2m".to_string());
        let settings = RenderSettings::default();

        let a = resolve_attributes(&record, &settings, &[]);
        let b = resolve_attributes(&record, &settings, &[]);
        assert_eq!(a, b);
        assert_eq!(
            a.iter().collect::<Vec<_>>(),
            b.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn blank_optionals_are_omitted_not_emitted_empty() {
        let mut record = bare_record();
        record.touch_action = Some("   ".to_string());
        record.camera_target = Some(String::new());
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        assert!(!map.contains("touch-action"));
        assert!(!map.contains("camera-target"));
        assert!(!map.contains("poster"));
        // camera-controls is a real flag with an empty value
        assert_eq!(map.get("camera-controls"), Some(""));
    }

    #[test]
    fn auto_rotate_emits_block_with_defaults() {
        let mut record = bare_record();
        record.auto_rotate = true;
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        assert_eq!(map.get("auto-rotate"), Some(""));
        assert_eq!(map.get("auto-rotate-delay"), Some("5000"));
        assert_eq!(map.get("rotation-per-second"), Some("30deg"));
    }

    #[test]
    fn auto_rotate_disabled_emits_nothing() {
        let record = bare_record();
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        assert!(!map.contains("auto-rotate"));
        assert!(!map.contains("auto-rotate-delay"));
        assert!(!map.contains("rotation-per-second"));
    }

    #[test]
    fn numeric_rotation_speed_gains_deg_suffix_exactly_once() {
        assert_eq!(normalize_rotation_speed("45"), "45deg");
        assert_eq!(normalize_rotation_speed("45deg"), "45deg");
        assert_eq!(normalize_rotation_speed("1.5"), "1.5deg");
        assert_eq!(normalize_rotation_speed(" 30 "), "30deg");
        assert_eq!(normalize_rotation_speed("fast"), "fast");

        let mut record = bare_record();
        record.auto_rotate = true;
        record.rotation_speed = Some("45".to_string());
        let map = resolve_attributes(&record, &RenderSettings::default(), &[]);
        assert_eq!(map.get("rotation-per-second"), Some("45deg"));
    }

    #[test]
    fn set_overwrites_in_place_keeping_position() {
        let mut map = AttributeMap::new();
        map.set("src", "a.glb");
        map.set("alt", "thing");
        map.set("src", "b.glb");
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("src", "b.glb"), ("alt", "thing")]);
    }

    #[test]
    fn transformer_chain_runs_last_and_wins() {
        let record = bare_record();
        let transforms: Vec<AttributeTransform> = vec![
            Box::new(|map: &mut AttributeMap| {
                map.set("src", "https://cdn.example/override.glb");
                map.set("ar", "");
            }),
            Box::new(|map: &mut AttributeMap| {
                map.set("ar-modes", "webxr scene-viewer");
            }),
        ];
        let map = resolve_attributes(&record, &RenderSettings::default(), &transforms);
        assert_eq!(map.get("src"), Some("https://cdn.example/override.glb"));
        assert_eq!(map.get("ar"), Some(""));
        assert_eq!(map.get("ar-modes"), Some("webxr scene-viewer"));
        // Overwritten src keeps first position
        assert_eq!(map.iter().next(), Some(("src", "https://cdn.example/override.glb")));
    }
}
