//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call vitrine_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        // Base URL used when building public links to uploaded files
        .set_default("server.public_url", "http://localhost:8080")?
        .set_default("database.max_connections", 10)?
        .set_default("database.min_connections", 2)?
        .set_default("auth.token_ttl_secs", 86_400)? // 24 h
        .set_default("storage.data_dir", "./data/uploads")?
        .set_default("limits.max_upload_bytes", 52_428_800)? // 50MB default
        .set_default("limits.max_shortcodes_per_render", 25)?
        .set_default("probe.head_timeout_secs", 3)?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (VITRINE_SERVER__HOST, VITRINE_DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("VITRINE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL (e.g. "https://vitrine.example.com").
    /// Used to build `file_url` values for locally stored models.
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// Redis connection URL — optional; omit to run with the embed cache disabled.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256) — should be 256+ bits of entropy
    pub jwt_secret: String,
    /// Shared admin key exchanged for a capability token at POST /auth/token
    pub admin_key: String,
    /// Issued token TTL in seconds
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Local directory for uploaded model binaries (default: ./data/uploads).
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    /// Cap on shortcode expansions per /render call.
    pub max_shortcodes_per_render: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Timeout for remote HEAD probes during large-file detection.
    pub head_timeout_secs: u64,
}
