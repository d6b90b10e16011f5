//! Large-file detection.
//!
//! Deciding between the inline and deferred templates needs the model's file
//! size. Cheapest source wins: the size recorded at upload, then a stat of
//! the local binary, then an HTTP HEAD against the remote URL. Every probe
//! failure means "not large" — detection never blocks a render.

use vitrine_common::models::model::ModelRecord;
use vitrine_common::models::settings::{LargeModelHandling, RenderSettings};

/// HTTP HEAD prober for remotely hosted model files.
#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    /// Build a prober with a short fixed timeout.
    pub fn new(head_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(head_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Content-length of a remote file, or None on any failure.
    pub async fn head_content_length(&self, url: &str) -> Option<u64> {
        match self.client.head(url).send().await {
            Ok(resp) if resp.status().is_success() => resp
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok()),
            Ok(resp) => {
                tracing::debug!(url, status = %resp.status(), "HEAD probe non-success");
                None
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "HEAD probe failed; treating as not large");
                None
            }
        }
    }

    /// Whether a remote file appears reachable (model file existence check).
    pub async fn remote_exists(&self, url: &str) -> bool {
        matches!(self.client.head(url).send().await, Ok(resp) if resp.status().is_success())
    }
}

/// Best known file size for a record. `local_size` is the caller's stat of
/// the stored binary (when one exists); the HEAD probe only runs for
/// externally hosted files with no recorded size.
pub async fn resolve_file_size(
    record: &ModelRecord,
    local_size: Option<u64>,
    prober: &Prober,
) -> Option<u64> {
    if let Some(size) = record.file_size.filter(|s| *s > 0) {
        return Some(size as u64);
    }
    if record.storage_key.is_some() {
        // Locally stored: trust the stat, never probe over HTTP
        return local_size;
    }
    prober.head_content_length(&record.file_url).await
}

/// Template selection: defer loading only when the poster-button handling is
/// configured, a poster exists, and the file meets the size threshold.
/// Unknown size fails open to the inline template.
pub fn should_defer_loading(
    record: &ModelRecord,
    settings: &RenderSettings,
    file_size: Option<u64>,
) -> bool {
    if settings.large_model_handling() != LargeModelHandling::PosterButton {
        return false;
    }
    let has_poster = record
        .poster_url
        .as_deref()
        .map(str::trim)
        .is_some_and(|p| !p.is_empty());
    if !has_poster {
        return false;
    }

    let threshold_bytes = settings.large_model_threshold_mb.saturating_mul(1024 * 1024);
    match file_size {
        Some(size) => size >= threshold_bytes,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(file_size: Option<i64>, poster: Option<&str>) -> ModelRecord {
        ModelRecord {
            id: 1,
            name: "Engine".to_string(),
            alt_text: None,
            file_url: "https://site/engine.glb".to_string(),
            storage_key: None,
            file_size,
            poster_url: poster.map(str::to_string),
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

    fn poster_button_settings() -> RenderSettings {
        let mut s = RenderSettings::default();
        s.large_model_handling = "poster_button".to_string();
        s
    }

    const MB: u64 = 1024 * 1024;

    #[test]
    fn thirty_mb_file_defers_with_poster_button_handling() {
        let r = record(Some(30 * MB as i64), Some("https://site/p.webp"));
        assert!(should_defer_loading(&r, &poster_button_settings(), Some(30 * MB)));
    }

    #[test]
    fn direct_handling_never_defers() {
        let r = record(Some(30 * MB as i64), Some("https://site/p.webp"));
        assert!(!should_defer_loading(&r, &RenderSettings::default(), Some(30 * MB)));
    }

    #[test]
    fn no_poster_means_no_deferral() {
        let r = record(Some(30 * MB as i64), None);
        assert!(!should_defer_loading(&r, &poster_button_settings(), Some(30 * MB)));

        let r = record(Some(30 * MB as i64), Some("   "));
        assert!(!should_defer_loading(&r, &poster_button_settings(), Some(30 * MB)));
    }

    #[test]
    fn below_threshold_stays_inline() {
        let r = record(Some(15 * MB as i64), Some("https://site/p.webp"));
        assert!(!should_defer_loading(&r, &poster_button_settings(), Some(15 * MB)));
        // exactly at the threshold counts as large
        assert!(should_defer_loading(&r, &poster_button_settings(), Some(16 * MB)));
    }

    #[test]
    fn unknown_size_fails_open() {
        let r = record(None, Some("https://site/p.webp"));
        assert!(!should_defer_loading(&r, &poster_button_settings(), None));
    }

    #[tokio::test]
    async fn recorded_size_wins_over_probe() {
        let prober = Prober::new(1);
        let r = record(Some(5), Some("https://site/p.webp"));
        // No network touched: recorded size short-circuits
        assert_eq!(resolve_file_size(&r, None, &prober).await, Some(5));
    }

    #[tokio::test]
    async fn local_records_never_probe_remotely() {
        let prober = Prober::new(1);
        let mut r = record(None, None);
        r.storage_key = Some("models/abc-engine.glb".to_string());
        assert_eq!(resolve_file_size(&r, Some(123), &prober).await, Some(123));
        assert_eq!(resolve_file_size(&r, None, &prober).await, None);
    }
}
