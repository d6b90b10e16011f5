//! Markup rendering — serializes a resolved attribute map into an HTML
//! fragment.
//!
//! Two templates exist. The standard template emits the `<model-viewer>`
//! element inline. The deferred template (large files behind a poster) emits
//! a poster + load button and ships the attribute map as JSON for the client
//! to construct the element after a click or view intersection.
//!
//! A record without a usable `src` never produces a custom element — callers
//! get a plain-text fallback instead of a broken component.

use crate::attributes::AttributeMap;
use vitrine_common::models::model::ModelRecord;
use vitrine_common::models::settings::RenderSettings;

/// Literal fallback emitted for an unknown or invalid model id.
pub const MODEL_NOT_FOUND: &str = "3D model not found.";

/// Fallback emitted when a record has no model file to show.
pub const MODEL_FILE_MISSING: &str = "3D model file is missing.";

/// Escape a string for use inside an HTML attribute value or text node.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Per-instance container id so multiple embeds of the same model on one
/// page get distinct CSS scopes.
pub fn container_id(model_id: i64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("vitrine-{model_id}-{}", &suffix[..8])
}

/// Serialize the attribute map as HTML attributes: flags as bare names,
/// valued attributes escaped.
fn attrs_to_html(attrs: &AttributeMap) -> String {
    let mut out = String::new();
    for (name, value) in attrs.iter() {
        out.push(' ');
        if value.is_empty() {
            out.push_str(name);
        } else {
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
    }
    out
}

/// `<script type="module">` tag loading the model-viewer library, from the
/// configured source.
fn viewer_script_tag(settings: &RenderSettings) -> String {
    let src = match settings.asset_source.as_str() {
        "local" => "/assets/model-viewer.min.js".to_string(),
        _ => format!(
            "https://ajax.googleapis.com/ajax/libs/model-viewer/{}/model-viewer.min.js",
            settings.viewer_version
        ),
    };
    format!(r#"<script type="module" src="{}"></script>"#, escape_html(&src))
}

/// Scoped `<style>` block: always the container rule, plus `@media` blocks
/// only when tablet/mobile overrides are present on the record.
fn style_block(id: &str, record: &ModelRecord) -> String {
    let mut css = format!("#{id} {{ display: block; position: relative; }}\n");

    if record.tablet_width.is_some() || record.tablet_height.is_some() {
        css.push_str(&format!(
            "@media (min-width: 768px) and (max-width: 1024px) {{ #{id} model-viewer {{ {} }} }}\n",
            dimension_overrides(&record.tablet_width, &record.tablet_height),
        ));
    }
    if record.mobile_width.is_some() || record.mobile_height.is_some() {
        css.push_str(&format!(
            "@media (max-width: 767px) {{ #{id} model-viewer {{ {} }} }}\n",
            dimension_overrides(&record.mobile_width, &record.mobile_height),
        ));
    }

    format!("<style>\n{css}</style>")
}

fn dimension_overrides(width: &Option<String>, height: &Option<String>) -> String {
    let mut rules = Vec::new();
    if let Some(w) = width.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        rules.push(format!("width: {w} !important;"));
    }
    if let Some(h) = height.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        rules.push(format!("height: {h} !important;"));
    }
    rules.join(" ")
}

/// Render the standard inline template.
pub fn render_standard(
    record: &ModelRecord,
    settings: &RenderSettings,
    attrs: &AttributeMap,
) -> String {
    match attrs.get("src").filter(|s| !s.is_empty()) {
        Some(_) => {}
        None => return MODEL_FILE_MISSING.to_string(),
    }

    let id = container_id(record.id);
    format!(
        "{script}\n{style}\n<div id=\"{id}\" class=\"vitrine-embed\">\n  <model-viewer{attrs}></model-viewer>\n</div>",
        script = viewer_script_tag(settings),
        style = style_block(&id, record),
        attrs = attrs_to_html(attrs),
    )
}

/// Render the deferred large-model template: poster + load button, with the
/// attribute map serialized as JSON for client-side element construction.
pub fn render_deferred(
    record: &ModelRecord,
    settings: &RenderSettings,
    attrs: &AttributeMap,
) -> String {
    match attrs.get("src").filter(|s| !s.is_empty()) {
        Some(_) => {}
        None => return MODEL_FILE_MISSING.to_string(),
    }

    let id = container_id(record.id);
    let poster = attrs.get("poster").unwrap_or_default();
    let alt = attrs.get("alt").unwrap_or_default();

    let attr_json: serde_json::Value = attrs
        .iter()
        .map(|(n, v)| (n.to_string(), serde_json::Value::String(v.to_string())))
        .collect::<serde_json::Map<_, _>>()
        .into();

    format!(
        concat!(
            "{script}\n{style}\n",
            "<div id=\"{id}\" class=\"vitrine-embed vitrine-deferred\" data-model-attrs=\"{json}\">\n",
            "  <img class=\"vitrine-poster\" src=\"{poster}\" alt=\"{alt}\" loading=\"lazy\">\n",
            "  <button type=\"button\" class=\"vitrine-load-button\">Load 3D model</button>\n",
            "</div>"
        ),
        script = viewer_script_tag(settings),
        style = style_block(&id, record),
        id = id,
        json = escape_html(&attr_json.to_string()),
        poster = escape_html(poster),
        alt = escape_html(alt),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::resolve_attributes;
    use chrono::Utc;

    fn record() -> ModelRecord {
        ModelRecord {
            id: 7,
            name: "Vase".to_string(),
            alt_text: Some(r#"A "tall" vase & lid"#.to_string()),
            file_url: "https://site/vase.glb".to_string(),
            storage_key: None,
            file_size: None,
            poster_url: Some("https://site/vase.webp".to_string()),
            viewer_size: "small".to_string(),
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
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn standard_template_escapes_attribute_values() {
        let r = record();
        let attrs = resolve_attributes(&r, &RenderSettings::default(), &[]);
        let html = render_standard(&r, &RenderSettings::default(), &attrs);
        assert!(html.contains("<model-viewer"));
        assert!(html.contains(r#"alt="A &quot;tall&quot; vase &amp; lid""#));
        // flags are bare names
        assert!(html.contains(" camera-controls"));
        assert!(!html.contains(r#"camera-controls="""#));
    }

    #[test]
    fn missing_src_emits_fallback_not_element() {
        let mut r = record();
        r.file_url = String::new();
        let attrs = resolve_attributes(&r, &RenderSettings::default(), &[]);
        let html = render_standard(&r, &RenderSettings::default(), &attrs);
        assert_eq!(html, MODEL_FILE_MISSING);
        assert!(!html.contains("<model-viewer"));

        let html = render_deferred(&r, &RenderSettings::default(), &attrs);
        assert_eq!(html, MODEL_FILE_MISSING);
    }

    #[test]
    fn media_blocks_only_when_overrides_present() {
        let mut r = record();
        let attrs = resolve_attributes(&r, &RenderSettings::default(), &[]);
        let html = render_standard(&r, &RenderSettings::default(), &attrs);
        assert!(!html.contains("@media"));

        r.tablet_width = Some("400px".to_string());
        let html = render_standard(&r, &RenderSettings::default(), &attrs);
        assert!(html.contains("@media (min-width: 768px) and (max-width: 1024px)"));
        assert!(html.contains("width: 400px !important;"));
        assert!(!html.contains("@media (max-width: 767px)"));

        r.mobile_height = Some("300px".to_string());
        let html = render_standard(&r, &RenderSettings::default(), &attrs);
        assert!(html.contains("@media (max-width: 767px)"));
        assert!(html.contains("height: 300px !important;"));
    }

    #[test]
    fn deferred_template_ships_attrs_as_json_without_element() {
        let r = record();
        let attrs = resolve_attributes(&r, &RenderSettings::default(), &[]);
        let html = render_deferred(&r, &RenderSettings::default(), &attrs);
        assert!(!html.contains("<model-viewer"));
        assert!(html.contains("vitrine-load-button"));
        assert!(html.contains("data-model-attrs="));
        assert!(html.contains(r#"src="https://site/vase.webp""#)); // poster img

        // The JSON survives an unescape round-trip
        let start = html.find("data-model-attrs=\"").unwrap() + "data-model-attrs=\"".len();
        let end = html[start..].find('"').unwrap() + start;
        let unescaped = html[start..end]
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        let parsed: serde_json::Value = serde_json::from_str(&unescaped).unwrap();
        assert_eq!(parsed["src"], "https://site/vase.glb");
    }

    #[test]
    fn script_source_follows_asset_settings() {
        let r = record();
        let attrs = resolve_attributes(&r, &RenderSettings::default(), &[]);

        let mut settings = RenderSettings::default();
        settings.viewer_version = "3.4.0".to_string();
        let html = render_standard(&r, &settings, &attrs);
        assert!(html.contains("model-viewer/3.4.0/model-viewer.min.js"));

        settings.asset_source = "local".to_string();
        let html = render_standard(&r, &settings, &attrs);
        assert!(html.contains(r#"src="/assets/model-viewer.min.js""#));
    }

    #[test]
    fn container_ids_are_unique_per_instance() {
        let a = container_id(5);
        let b = container_id(5);
        assert_ne!(a, b);
        assert!(a.starts_with("vitrine-5-"));
    }
}
