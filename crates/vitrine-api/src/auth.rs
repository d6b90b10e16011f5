//! Authentication — capability-scoped JWT tokens.
//!
//! Vitrine has no end-user accounts. Operators exchange the configured admin
//! key for a short-lived token carrying capability claims; every mutating
//! endpoint checks the capability it needs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Capability required to create/update/delete models and uploads.
pub const CAP_MANAGE_MODELS: &str = "manage_models";
/// Capability required to change settings, import/export, and flush caches.
pub const CAP_MANAGE_SETTINGS: &str = "manage_settings";

/// JWT claims embedded in management tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject — fixed "vitrine-admin" for operator tokens
    pub sub: String,
    /// Granted capabilities
    pub caps: Vec<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Generate a management token carrying the given capabilities.
pub fn generate_token(
    caps: &[&str],
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: "vitrine-admin".to_string(),
        caps: caps.iter().map(|c| c.to_string()).collect(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    #[test]
    fn tokens_round_trip_with_capabilities() {
        let token =
            generate_token(&[CAP_MANAGE_MODELS, CAP_MANAGE_SETTINGS], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "vitrine-admin");
        assert!(claims.caps.iter().any(|c| c == CAP_MANAGE_MODELS));
        assert!(claims.caps.iter().any(|c| c == CAP_MANAGE_SETTINGS));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(&[CAP_MANAGE_MODELS], SECRET, 60).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // jsonwebtoken's default validation applies 60s leeway
        let now = Utc::now();
        let claims = Claims {
            sub: "vitrine-admin".to_string(),
            caps: vec![CAP_MANAGE_MODELS.to_string()],
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }
}
