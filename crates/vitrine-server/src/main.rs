//! # Vitrine Server
//!
//! Single-binary deployment: REST API, public embed rendering, and local
//! file serving in one process. PostgreSQL holds the records, Redis (when
//! configured) holds the embed cache, uploads land on the local filesystem.

use std::net::SocketAddr;
use std::time::Instant;
use vitrine_api::{build_router, AppState};
use vitrine_db::{storage::Storage, Database};
use vitrine_render::probe::Prober;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = vitrine_common::config::init()?;

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting Vitrine v{}", env!("CARGO_PKG_VERSION"));

    // Connect to databases
    let db = Database::connect(config).await?;

    // Run migrations
    db.migrate().await?;

    // Local storage for uploaded model binaries
    let storage = Storage::open(&config.storage.data_dir).await?;
    tracing::info!("Storage ready at {}", config.storage.data_dir);

    // HEAD prober for remote large-file detection
    let prober = Prober::new(config.probe.head_timeout_secs);

    let state = AppState {
        db,
        storage,
        prober,
        started_at: Instant::now(),
    };

    let router = build_router(state);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
