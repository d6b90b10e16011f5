//! Token issuance.
//!
//! POST /api/v1/auth/token — exchange the configured admin key for a
//! capability-scoped management token.

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use vitrine_common::error::{VitrineError, VitrineResult};

use crate::auth::{generate_token, CAP_MANAGE_MODELS, CAP_MANAGE_SETTINGS};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/token", post(issue_token))
}

#[derive(Deserialize)]
struct TokenRequest {
    admin_key: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
    expires_in: u64,
    token_type: String,
}

/// Compare digests rather than raw strings so the comparison time doesn't
/// leak the matching prefix length.
fn keys_match(submitted: &str, configured: &str) -> bool {
    let a = Sha256::digest(submitted.as_bytes());
    let b = Sha256::digest(configured.as_bytes());
    a == b
}

async fn issue_token(Json(body): Json<TokenRequest>) -> VitrineResult<Json<TokenResponse>> {
    let config = vitrine_common::config::get();

    if config.auth.admin_key.is_empty() || !keys_match(&body.admin_key, &config.auth.admin_key) {
        return Err(VitrineError::InvalidCredentials);
    }

    let token = generate_token(
        &[CAP_MANAGE_MODELS, CAP_MANAGE_SETTINGS],
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    )
    .map_err(|e| VitrineError::Internal(e.into()))?;

    Ok(Json(TokenResponse {
        token,
        expires_in: config.auth.token_ttl_secs,
        token_type: "Bearer".to_string(),
    }))
}
