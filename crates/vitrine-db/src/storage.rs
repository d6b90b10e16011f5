//! Local filesystem storage for uploaded model binaries.
//!
//! Files live under `{data_dir}/models/`, keyed by a UUID-prefixed filename
//! so uploads never collide. The directory carries an empty `index.html`
//! marker so a misconfigured front-end web server cannot produce a listing
//! of everyone's uploads.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Subdirectory of the data dir that holds model binaries.
const MODELS_SUBDIR: &str = "models";

/// Local storage client — all uploaded binaries go through here.
#[derive(Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open (and create if needed) the storage root, including the
    /// listing-blocking marker file.
    pub async fn open(data_dir: &str) -> Result<Self> {
        let root = PathBuf::from(data_dir).join(MODELS_SUBDIR);
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create storage dir {}", root.display()))?;

        let marker = root.join("index.html");
        if !marker.exists() {
            tokio::fs::write(&marker, b"")
                .await
                .context("Failed to write storage marker file")?;
        }

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
        })
    }

    /// Generate a collision-free storage key for an uploaded filename.
    ///
    /// The original (sanitized) filename is kept as a suffix so downloads
    /// stay human-readable.
    pub fn make_key(filename: &str) -> String {
        let safe = sanitize_filename(filename);
        format!("{}/{}-{}", MODELS_SUBDIR, Uuid::now_v7().simple(), safe)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(key)
    }

    /// Write uploaded bytes under the given key.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write upload to {}", path.display()))?;
        Ok(())
    }

    /// Read a stored file, returning None when it does not exist.
    /// The content type is inferred from the extension.
    pub async fn read(&self, key: &str) -> Result<Option<(Vec<u8>, &'static str)>> {
        // Refuse path traversal outright
        if key.contains("..") {
            return Ok(None);
        }

        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some((bytes, content_type_for(key)))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Size in bytes of a stored file, or None when absent.
    pub async fn file_size(&self, key: &str) -> Option<u64> {
        if key.contains("..") {
            return None;
        }
        tokio::fs::metadata(self.path_for(key))
            .await
            .ok()
            .map(|m| m.len())
    }

    /// Delete a stored file. Missing files are not an error — the record is
    /// already gone, which is the state we wanted.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

/// Strip path separators and control characters from an uploaded filename.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim_matches(['.', ' ']);
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Content type for a stored model or poster file, by extension.
fn content_type_for(key: &str) -> &'static str {
    let ext = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        "usdz" => "model/vnd.usdz+zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("my model.glb"), "my model.glb");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    #[test]
    fn keys_are_unique_per_upload() {
        let a = Storage::make_key("chair.glb");
        let b = Storage::make_key("chair.glb");
        assert_ne!(a, b);
        assert!(a.starts_with("models/"));
        assert!(a.ends_with("chair.glb"));
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("models/x.glb"), "model/gltf-binary");
        assert_eq!(content_type_for("models/x.usdz"), "model/vnd.usdz+zip");
        assert_eq!(content_type_for("models/x.bin"), "application/octet-stream");
    }
}
