//! Model upload — multipart/form-data.
//!
//! POST /api/v1/models/upload
//!
//! Form fields:
//! - `file`     — the model binary (required; glb/gltf/usdz)
//! - `name`     — display name (optional; defaults to the filename stem)
//! - `alt_text` — accessibility text (optional)

use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, State},
    middleware,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use vitrine_common::error::{VitrineError, VitrineResult};
use vitrine_common::models::model::ModelRecord;
use vitrine_common::validation::validate_model_extension;
use vitrine_db::{repository::models, storage::Storage};

use crate::middleware::AuthContext;
use crate::AppState;

/// Content types accepted for model binaries. Browsers are inconsistent
/// about 3D formats, so a generic octet-stream with a valid extension also
/// passes.
fn is_allowed_content_type(ct: &str) -> bool {
    matches!(
        ct,
        "model/gltf-binary"
            | "model/gltf+json"
            | "model/vnd.usdz+zip"
            | "application/octet-stream"
    )
}

/// Headroom on top of the file limit for multipart framing and text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Request body cap for the upload route. Axum's default 2 MB body limit
/// would reject large model files before the handler ever saw them, so the
/// route carries its own limit derived from the configured maximum.
fn body_limit(max_upload_bytes: u64) -> usize {
    max_upload_bytes as usize + MULTIPART_OVERHEAD
}

pub fn router() -> Router<Arc<AppState>> {
    let max_upload_bytes = vitrine_common::config::get().limits.max_upload_bytes;
    Router::new()
        .route("/models/upload", post(upload_model))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
        .layer(DefaultBodyLimit::max(body_limit(max_upload_bytes)))
}

async fn upload_model(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> VitrineResult<Json<ModelRecord>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;

    let config = vitrine_common::config::get();
    let max_bytes = config.limits.max_upload_bytes as usize;

    let mut file_data: Option<Vec<u8>> = None;
    let mut filename = String::from("upload.glb");
    let mut name: Option<String> = None;
    let mut alt_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VitrineError::Validation {
            message: format!("Multipart error: {e}"),
        })?
    {
        match field.name() {
            Some("file") => {
                if let Some(fn_) = field.file_name() {
                    filename = fn_.to_string();
                }
                validate_model_extension(&filename)?;

                if let Some(ct) = field.content_type() {
                    let ct = ct.to_string();
                    if !is_allowed_content_type(&ct) {
                        return Err(VitrineError::UnsupportedFileType { content_type: ct });
                    }
                }

                let bytes = field.bytes().await.map_err(|e| VitrineError::Validation {
                    message: format!("Failed to read file: {e}"),
                })?;

                check_file_size(bytes.len(), max_bytes)?;

                file_data = Some(bytes.to_vec());
            }
            Some("name") => {
                let val = field.text().await.unwrap_or_default();
                if !val.trim().is_empty() {
                    name = Some(val.trim().to_string());
                }
            }
            Some("alt_text") => {
                let val = field.text().await.unwrap_or_default();
                if !val.trim().is_empty() {
                    alt_text = Some(val.trim().to_string());
                }
            }
            _ => {} // Ignore unknown fields
        }
    }

    let data = file_data.ok_or(VitrineError::Validation {
        message: "No file field in request".into(),
    })?;

    let storage_key = Storage::make_key(&filename);
    state.storage.put(&storage_key, &data).await?;

    let file_url = format!(
        "{}/files/{}",
        config.server.public_url.trim_end_matches('/'),
        storage_key
    );

    let display_name = name.unwrap_or_else(|| filename_stem(&filename));

    let record = models::create_model(
        &state.db.pg,
        &display_name,
        alt_text.as_deref(),
        &file_url,
        Some(&storage_key),
        Some(data.len() as i64),
    )
    .await;

    match record {
        Ok(record) => {
            tracing::info!(
                model_id = record.id,
                size = data.len(),
                "Model uploaded: {display_name}"
            );
            Ok(Json(record))
        }
        Err(e) => {
            // Don't leave an orphaned binary behind a failed insert
            let _ = state.storage.delete(&storage_key).await;
            Err(e.into())
        }
    }
}

fn check_file_size(size: usize, max: usize) -> VitrineResult<()> {
    if size > max {
        return Err(VitrineError::FileTooLarge { size, max });
    }
    if size == 0 {
        return Err(VitrineError::Validation {
            message: "Uploaded file is empty".into(),
        });
    }
    Ok(())
}

/// Filename without its extension, for use as a default display name.
fn filename_stem(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|s| !s.is_empty())
        .unwrap_or(filename)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_only_the_extension() {
        assert_eq!(filename_stem("walnut chair.glb"), "walnut chair");
        assert_eq!(filename_stem("archive.tar.glb"), "archive.tar");
        assert_eq!(filename_stem("noext"), "noext");
        assert_eq!(filename_stem(".glb"), ".glb");
    }

    #[test]
    fn oversized_files_are_rejected() {
        let max = 52_428_800;
        assert!(matches!(
            check_file_size(max + 1, max),
            Err(VitrineError::FileTooLarge { .. })
        ));
        assert!(check_file_size(max, max).is_ok());
        assert!(check_file_size(1, max).is_ok());
        assert!(matches!(
            check_file_size(0, max),
            Err(VitrineError::Validation { .. })
        ));
    }

    #[test]
    fn route_body_limit_leaves_room_for_multipart_framing() {
        // A file exactly at the configured maximum must fit in the body
        let max = 52_428_800u64;
        assert!(body_limit(max) > max as usize);
        // Well past axum's 2 MB extractor default
        assert!(body_limit(max) > 2 * 1024 * 1024);
    }

    #[test]
    fn model_content_types() {
        assert!(is_allowed_content_type("model/gltf-binary"));
        assert!(is_allowed_content_type("application/octet-stream"));
        assert!(!is_allowed_content_type("text/html"));
        assert!(!is_allowed_content_type("image/png"));
    }
}
