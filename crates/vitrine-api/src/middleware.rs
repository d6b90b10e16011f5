//! Middleware — authentication extraction, capability checks, security headers.

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use vitrine_common::error::VitrineError;

use crate::auth;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub caps: Vec<String>,
}

impl AuthContext {
    /// Require a capability, or fail with a generic 403.
    pub fn require(&self, capability: &str) -> Result<(), VitrineError> {
        if self.caps.iter().any(|c| c == capability) {
            Ok(())
        } else {
            tracing::debug!(capability, "Capability check failed");
            Err(VitrineError::MissingCapability {
                capability: capability.to_string(),
            })
        }
    }
}

/// Extract and validate the JWT from the Authorization: Bearer <token> header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, VitrineError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(VitrineError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(VitrineError::Unauthorized)?;

    let config = vitrine_common::config::get();
    let claims = auth::validate_token(token, &config.auth.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        VitrineError::InvalidToken
    })?;

    let auth_ctx = AuthContext { caps: claims.caps };

    // Insert auth context into request extensions for handlers to use
    request.extensions_mut().insert(auth_ctx);

    Ok(next.run(request).await)
}

/// Add defensive security headers to every HTTP response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    let headers: &[(&str, &str)] = &[
        ("X-Content-Type-Options", "nosniff"),
        ("X-Frame-Options", "SAMEORIGIN"),
        ("Referrer-Policy", "strict-origin-when-cross-origin"),
        ("Permissions-Policy", "camera=(), microphone=(), geolocation=()"),
    ];

    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            header::HeaderName::try_from(*name),
            header::HeaderValue::try_from(*value),
        ) {
            h.insert(name, value);
        }
    }

    response
}
