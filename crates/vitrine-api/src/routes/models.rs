//! Model management routes.
//!
//! GET    /api/v1/models                  — list records (paginated)
//! GET    /api/v1/models/{id}             — fetch one record
//! PATCH  /api/v1/models/{id}             — overwrite display configuration
//! DELETE /api/v1/models/{id}             — delete record + binary + cache entry
//! GET    /api/v1/models/{id}/file-check  — is the referenced binary reachable?

use axum::{
    extract::{Extension, Path, Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vitrine_common::{
    error::{VitrineError, VitrineResult},
    models::model::{ModelRecord, UpdateModelRequest},
    validation::validate_request,
};
use vitrine_db::repository::models;

use crate::middleware::AuthContext;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/models", get(list_models))
        .route(
            "/models/{id}",
            get(get_model).patch(update_model).delete(delete_model),
        )
        .route("/models/{id}/file-check", get(file_check))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

// ============================================================
// Read
// ============================================================

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_models(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> VitrineResult<Json<Vec<ModelRecord>>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let records = models::list_models(&state.db.pg, limit, offset).await?;
    Ok(Json(records))
}

async fn get_model(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> VitrineResult<Json<ModelRecord>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;

    let record = models::find_by_id(&state.db.pg, id)
        .await?
        .ok_or(VitrineError::NotFound {
            resource: "Model".into(),
        })?;
    Ok(Json(record))
}

// ============================================================
// Update
// ============================================================

/// PATCH /api/v1/models/{id} — full overwrite of the display configuration,
/// mirroring an edit-form save. Invalidates the model's cache entry before
/// responding.
async fn update_model(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateModelRequest>,
) -> VitrineResult<Json<ModelRecord>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;
    validate_request(&body)?;

    let record = models::update_model(&state.db.pg, id, &body)
        .await?
        .ok_or(VitrineError::NotFound {
            resource: "Model".into(),
        })?;

    super::cache::invalidate_model(&state, id).await;

    Ok(Json(record))
}

// ============================================================
// Delete
// ============================================================

#[derive(Serialize)]
struct DeleteResponse {
    deleted: bool,
}

/// DELETE /api/v1/models/{id} — removes the record, the stored binary, and
/// the cache entry. A missing binary is not an error.
async fn delete_model(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> VitrineResult<Json<DeleteResponse>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;

    let removed = models::delete_model(&state.db.pg, id)
        .await?
        .ok_or(VitrineError::NotFound {
            resource: "Model".into(),
        })?;

    if let Some(key) = &removed.storage_key {
        if let Err(e) = state.storage.delete(key).await {
            tracing::warn!(model_id = id, key, error = %e, "Failed to delete stored binary");
        }
    }

    super::cache::invalidate_model(&state, id).await;

    Ok(Json(DeleteResponse { deleted: true }))
}

// ============================================================
// File check
// ============================================================

#[derive(Serialize)]
struct FileCheckResponse {
    exists: bool,
    size_bytes: Option<u64>,
    location: &'static str,
}

/// GET /api/v1/models/{id}/file-check — verify the referenced binary is
/// still reachable (local stat, or HEAD for external URLs).
async fn file_check(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> VitrineResult<Json<FileCheckResponse>> {
    auth.require(crate::auth::CAP_MANAGE_MODELS)?;

    let record = models::find_by_id(&state.db.pg, id)
        .await?
        .ok_or(VitrineError::NotFound {
            resource: "Model".into(),
        })?;

    let response = match &record.storage_key {
        Some(key) => {
            let size = state.storage.file_size(key).await;
            FileCheckResponse {
                exists: size.is_some(),
                size_bytes: size,
                location: "local",
            }
        }
        None => {
            let size = state.prober.head_content_length(&record.file_url).await;
            let exists = size.is_some() || state.prober.remote_exists(&record.file_url).await;
            FileCheckResponse {
                exists,
                size_bytes: size,
                location: "remote",
            }
        }
    };

    Ok(Json(response))
}
