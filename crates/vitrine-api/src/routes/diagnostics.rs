//! Diagnostics export.
//!
//! GET /api/v1/diagnostics — plain-text report for support requests:
//! version, effective settings, model count, storage and cache reachability.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Router,
};
use std::fmt::Write;
use std::sync::Arc;
use vitrine_common::error::VitrineResult;
use vitrine_db::repository::models;

use crate::middleware::AuthContext;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/diagnostics", get(diagnostics_report))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

async fn diagnostics_report(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> VitrineResult<String> {
    auth.require(crate::auth::CAP_MANAGE_SETTINGS)?;

    let mut report = String::new();
    let _ = writeln!(report, "=== Vitrine Diagnostics ===");
    let _ = writeln!(report, "version: {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(report, "generated_at: {}", chrono::Utc::now().to_rfc3339());
    let _ = writeln!(report, "uptime_secs: {}", state.started_at.elapsed().as_secs());
    let _ = writeln!(report);

    let _ = writeln!(report, "--- Connectivity ---");
    let db_ok = vitrine_db::postgres::health_check(&state.db.pg).await;
    let _ = writeln!(report, "postgres: {}", if db_ok { "ok" } else { "UNREACHABLE" });
    let cache_status = match state.db.redis.clone() {
        Some(mut conn) => {
            if vitrine_db::transients::ping(&mut conn).await {
                "ok"
            } else {
                "UNREACHABLE"
            }
        }
        None => "disabled",
    };
    let _ = writeln!(report, "redis: {cache_status}");
    let _ = writeln!(report);

    let _ = writeln!(report, "--- Models ---");
    match models::count_models(&state.db.pg).await {
        Ok(count) => {
            let _ = writeln!(report, "count: {count}");
        }
        Err(e) => {
            let _ = writeln!(report, "count: error ({e})");
        }
    }
    let _ = writeln!(report);

    let _ = writeln!(report, "--- Settings ---");
    match super::settings::effective_settings(&state.db.pg).await {
        Ok(settings) => {
            for (key, value) in settings {
                let _ = writeln!(report, "{key} = {value}");
            }
        }
        Err(e) => {
            let _ = writeln!(report, "error loading settings: {e}");
        }
    }

    Ok(report)
}
