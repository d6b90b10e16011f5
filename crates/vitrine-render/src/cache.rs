//! Embed cache fingerprinting and entry format.
//!
//! One cache key per model (`vitrine:embed:{id}`). The stored entry carries a
//! fingerprint over every input that shapes the markup; a hit whose
//! fingerprint no longer matches is treated as a miss. This makes targeted
//! invalidation trivial (delete one key) and makes stale-after-settings-change
//! entries self-healing even if the synchronous full flush was missed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Key prefix for all embed cache entries.
pub const CACHE_PREFIX: &str = "vitrine:embed:";

/// Redis key for one model's cached markup.
pub fn cache_key(model_id: i64) -> String {
    format!("{CACHE_PREFIX}{model_id}")
}

/// SCAN pattern matching every embed cache entry (full-flush invalidation).
pub fn cache_pattern() -> String {
    format!("{CACHE_PREFIX}*")
}

/// Deterministic hash over everything that affects a model's rendered markup:
/// the model id, the running crate version, the allowlisted settings values,
/// and the record's last-modified timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(
        model_id: i64,
        crate_version: &str,
        settings_pairs: &[(&str, String)],
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model_id.to_le_bytes());
        hasher.update([0]);
        hasher.update(crate_version.as_bytes());
        hasher.update([0]);
        for (key, value) in settings_pairs {
            hasher.update(key.as_bytes());
            hasher.update([0x1f]);
            hasher.update(value.as_bytes());
            hasher.update([0]);
        }
        hasher.update(updated_at.timestamp_micros().to_le_bytes());

        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What actually gets stored in Redis, JSON-encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub markup: String,
}

impl CacheEntry {
    pub fn new(fingerprint: Fingerprint, markup: String) -> Self {
        Self { fingerprint, markup }
    }

    pub fn to_json(&self) -> String {
        // CacheEntry has no non-string payloads; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a stored entry; garbage (old formats, truncation) is a miss.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
