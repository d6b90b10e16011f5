//! Model record repository — CRUD over the `models` table.
//!
//! Binaries live in local storage (see [`crate::storage`]); this table holds
//! the display configuration and file reference.

use vitrine_common::models::model::{ModelRecord, UpdateModelRequest};
use sqlx::PgPool;

// ============================================================
// Create
// ============================================================

/// Insert a freshly uploaded model with display defaults.
pub async fn create_model(
    pool: &PgPool,
    name: &str,
    alt_text: Option<&str>,
    file_url: &str,
    storage_key: Option<&str>,
    file_size: Option<i64>,
) -> Result<ModelRecord, sqlx::Error> {
    sqlx::query_as::<_, ModelRecord>(
        r#"
        INSERT INTO models (name, alt_text, file_url, storage_key, file_size)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(alt_text)
    .bind(file_url)
    .bind(storage_key)
    .bind(file_size)
    .fetch_one(pool)
    .await
}

// ============================================================
// Read
// ============================================================

/// Find a model by ID.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ModelRecord>, sqlx::Error> {
    sqlx::query_as::<_, ModelRecord>("SELECT * FROM models WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List models, newest first (paginated).
pub async fn list_models(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ModelRecord>, sqlx::Error> {
    sqlx::query_as::<_, ModelRecord>(
        "SELECT * FROM models ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Total model count (diagnostics).
pub async fn count_models(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM models")
        .fetch_one(pool)
        .await
}

// ============================================================
// Update
// ============================================================

/// Overwrite a model's display configuration from an edit-form save.
///
/// Every configurable column is written — fields absent from the submitted
/// form revert to their defaults rather than keeping stale values. Bumps
/// `updated_at`, which rolls the cache fingerprint.
pub async fn update_model(
    pool: &PgPool,
    id: i64,
    req: &UpdateModelRequest,
) -> Result<Option<ModelRecord>, sqlx::Error> {
    sqlx::query_as::<_, ModelRecord>(
        r#"
        UPDATE models SET
            name = $2,
            alt_text = $3,
            poster_url = $4,
            viewer_size = $5,
            custom_width = $6,
            custom_height = $7,
            tablet_width = $8,
            tablet_height = $9,
            mobile_width = $10,
            mobile_height = $11,
            camera_controls = $12,
            disable_pan = $13,
            disable_tap = $14,
            disable_zoom = $15,
            touch_action = $16,
            orbit_sensitivity = $17,
            auto_rotate = $18,
            auto_rotate_delay = $19,
            rotation_speed = $20,
            camera_orbit = $21,
            camera_target = $22,
            field_of_view = $23,
            min_field_of_view = $24,
            max_field_of_view = $25,
            min_camera_orbit = $26,
            max_camera_orbit = $27,
            interaction_prompt = $28,
            interaction_prompt_style = $29,
            interaction_prompt_threshold = $30,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.alt_text)
    .bind(&req.poster_url)
    .bind(&req.viewer_size)
    .bind(&req.custom_width)
    .bind(&req.custom_height)
    .bind(&req.tablet_width)
    .bind(&req.tablet_height)
    .bind(&req.mobile_width)
    .bind(&req.mobile_height)
    .bind(req.camera_controls)
    .bind(req.disable_pan)
    .bind(req.disable_tap)
    .bind(req.disable_zoom)
    .bind(&req.touch_action)
    .bind(&req.orbit_sensitivity)
    .bind(req.auto_rotate)
    .bind(&req.auto_rotate_delay)
    .bind(&req.rotation_speed)
    .bind(&req.camera_orbit)
    .bind(&req.camera_target)
    .bind(&req.field_of_view)
    .bind(&req.min_field_of_view)
    .bind(&req.max_field_of_view)
    .bind(&req.min_camera_orbit)
    .bind(&req.max_camera_orbit)
    .bind(&req.interaction_prompt)
    .bind(&req.interaction_prompt_style)
    .bind(&req.interaction_prompt_threshold)
    .fetch_optional(pool)
    .await
}

// ============================================================
// Delete
// ============================================================

/// Delete a model, returning the removed row so the caller can clean up the
/// stored binary and the cache entry.
pub async fn delete_model(pool: &PgPool, id: i64) -> Result<Option<ModelRecord>, sqlx::Error> {
    sqlx::query_as::<_, ModelRecord>("DELETE FROM models WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
