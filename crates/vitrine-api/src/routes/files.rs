//! Local file serving for uploaded model binaries.
//!
//! `GET /files/{*key}` — serves files from local storage with immutable
//! cache headers (storage keys are UUID-prefixed, so content never changes
//! under a key).

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/files/{*key}", get(serve_file))
}

async fn serve_file(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    match state.storage.read(&key).await {
        Ok(Some((bytes, content_type))) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to serve local file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
