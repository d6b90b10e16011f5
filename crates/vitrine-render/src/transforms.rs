//! Built-in attribute transformers.
//!
//! The transformer chain is the extension seam of the resolver: each entry is
//! a pure map-in/map-out function applied after built-in resolution, so its
//! attributes win. Capability flags on the settings snapshot decide which
//! built-ins are active; deployments can append their own.

use crate::attributes::{AttributeMap, AttributeTransform};
use vitrine_common::models::settings::RenderSettings;

/// Assemble the transformer chain for a settings snapshot.
pub fn for_settings(settings: &RenderSettings) -> Vec<AttributeTransform> {
    let mut chain: Vec<AttributeTransform> = Vec::new();
    if settings.enable_ar {
        chain.push(Box::new(ar_attributes));
    }
    chain
}

/// Enable WebXR / Scene Viewer / Quick Look AR modes on the element.
fn ar_attributes(map: &mut AttributeMap) {
    map.set_flag("ar");
    map.set("ar-modes", "webxr scene-viewer quick-look");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ar_transform_only_active_when_enabled() {
        let mut settings = RenderSettings::default();
        assert!(for_settings(&settings).is_empty());

        settings.enable_ar = true;
        let chain = for_settings(&settings);
        assert_eq!(chain.len(), 1);

        let mut map = AttributeMap::new();
        map.set("src", "x.glb");
        for t in &chain {
            t(&mut map);
        }
        assert_eq!(map.get("ar"), Some(""));
        assert_eq!(map.get("ar-modes"), Some("webxr scene-viewer quick-look"));
    }
}
