//! # vitrine-render
//!
//! The embed rendering pipeline: model record + settings snapshot in,
//! HTML fragment out.
//!
//! - [`attributes`] — resolves a record into the ordered attribute map of the
//!   `<model-viewer>` element (pure).
//! - [`markup`] — serializes the attribute map into the standard or
//!   deferred-loading template (pure).
//! - [`transforms`] — built-in attribute transformer chain (extension seam).
//! - [`shortcode`] — expands `[model id="N"]` shortcodes inside content.
//! - [`cache`] — deterministic fingerprint + entry format for the embed cache.
//! - [`probe`] — large-file detection (file stat / HTTP HEAD, fail-open).

pub mod attributes;
pub mod cache;
pub mod markup;
pub mod probe;
pub mod shortcode;
pub mod transforms;
