use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optimux_core::{
    load_config, load_config_from_env, platform_trash_mover, validate_config, ChunkWriter,
    DeletionRegistry, Engine, FfmpegEngine, TrashMover,
};
use optimux_server::api::{create_router, spawn_heartbeat, WsBroadcaster, HEARTBEAT_INTERVAL};
use optimux_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("OPTIMUX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; the file is optional
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        load_config_from_env().context("Failed to load config from environment")?
    };

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Staging directory: {:?}", config.engine.staging_dir());

    let engine = FfmpegEngine::new(config.engine.clone());
    // Missing tools are reported, not fatal: jobs fail with a spawn error instead.
    match engine.validate().await {
        Ok(()) => info!("Encoder tools found"),
        Err(e) => warn!("Encoder check failed: {}", e),
    }
    let engine: Arc<dyn Engine> = Arc::new(engine);

    let trash = platform_trash_mover();
    info!("Using trash mechanism: {}", trash.name());
    let deletions = DeletionRegistry::new(config.files.max_pending_deletions, trash);

    let uploads = ChunkWriter::new(config.imports_dir());
    info!("Uploads go to {:?}", uploads.dir());

    let ws_broadcaster = WsBroadcaster::new(config.engine.event_buffer);
    let heartbeat = spawn_heartbeat(ws_broadcaster.clone(), HEARTBEAT_INTERVAL);

    let state = Arc::new(AppState::new(
        config.clone(),
        engine,
        deletions,
        uploads,
        ws_broadcaster,
    ));

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    heartbeat.abort();
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
