//! # vitrine-db
//!
//! Persistence layer for Vitrine. Manages connections to:
//! - **PostgreSQL** — model records and site settings (relational data)
//! - **Redis** — the embed markup cache (TTL "transient" entries)
//! - **Local filesystem** — uploaded model binaries

pub mod postgres;
pub mod repository;
pub mod storage;
pub mod transients;

use anyhow::Result;
use sqlx::PgPool;

/// Shared database state passed through Axum extractors.
///
/// Redis is optional by design: the embed cache is a performance layer, and
/// every caller must tolerate its absence.
#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
    pub redis: Option<redis::aio::ConnectionManager>,
}

impl Database {
    /// Connect to PostgreSQL and (when configured) Redis.
    pub async fn connect(config: &vitrine_common::config::AppConfig) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");
        let pg = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        let redis = match &config.redis.url {
            Some(url) => {
                tracing::info!("Connecting to Redis...");
                let client = redis::Client::open(url.as_str())?;
                let manager = redis::aio::ConnectionManager::new(client).await?;
                tracing::info!("Connected to Redis");
                Some(manager)
            }
            None => {
                tracing::warn!("No Redis URL configured; embed cache disabled");
                None
            }
        };

        Ok(Self { pg, redis })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}
