//! Settings repository — singleton key/value options.
//!
//! The schema (known keys, defaults, cache relevance) lives in
//! `vitrine_common::models::settings`; this module is pure storage.

use sqlx::PgPool;
use std::collections::BTreeMap;
use vitrine_common::models::settings::RenderSettings;

/// Load all stored settings rows.
pub async fn load_all(pool: &PgPool) -> Result<BTreeMap<String, String>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().collect())
}

/// Load the per-request immutable settings snapshot.
pub async fn load_snapshot(pool: &PgPool) -> Result<RenderSettings, sqlx::Error> {
    Ok(RenderSettings::from_rows(&load_all(pool).await?))
}

/// Upsert a single setting.
pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a setting only if it does not already exist (import merge mode).
/// Returns true when the row was written.
pub async fn set_if_absent(pool: &PgPool, key: &str, value: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
