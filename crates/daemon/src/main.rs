mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kinoscout_core::{
    config::LoggingConfig, load_config, validate_config, DedupStore, FilmCatalog, FilmPipeline,
    KinotamClient, Notifier, RunCycle, SanitizedConfig, SqliteDedupStore, TelegramNotifier,
    TorrentApiClient,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging is not up yet when config loading fails.
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("KINOSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let _log_guard = init_logging(&config.logging)?;

    info!(version = VERSION, path = ?config_path, "Configuration loaded");
    info!(
        config = %serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default(),
        "Effective configuration"
    );

    // Open the dedup store; nothing runs without it
    let store: Arc<dyn DedupStore> = Arc::new(
        SqliteDedupStore::from_config(&config.database)
            .context("Failed to open dedup store")?,
    );
    info!(path = ?config.database.path, "Dedup store initialized");

    let catalog = Arc::new(
        KinotamClient::new(config.catalog.clone()).context("Failed to create catalog client")?,
    );
    let tracker_api = Arc::new(
        TorrentApiClient::new(config.tracker_api.clone())
            .context("Failed to create tracker API client")?,
    );
    info!(
        catalog = %config.catalog.url,
        kind = catalog.content_kind().label(),
        tracker_api = %config.tracker_api.url,
        "Clients initialized"
    );

    let notifier: Option<Arc<dyn Notifier>> = match &config.notifier {
        Some(tg_config) => {
            let notifier = TelegramNotifier::new(
                tg_config.clone(),
                catalog.content_kind(),
                catalog.base_url(),
            )
            .context("Failed to create Telegram notifier")?;
            info!(chat_id = %tg_config.chat_id, "Telegram notifications enabled");
            Some(Arc::new(notifier))
        }
        None => {
            info!("No notifier configured");
            None
        }
    };

    let pipeline = FilmPipeline::new(
        &config.matching,
        &config.tracker_api,
        tracker_api.clone(),
        tracker_api,
        Arc::clone(&store),
    );
    let cycle = RunCycle::new(
        catalog,
        pipeline,
        store,
        notifier,
        config.scheduler.clone(),
    );

    let state = Arc::new(AppState::new(config.clone()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start server if configured
    let server_handle = match &config.server {
        Some(server) => {
            let addr = SocketAddr::new(server.host, server.port);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind to {}", addr))?;
            info!("Starting server on {}", addr);

            let app = create_router(Arc::clone(&state));
            let mut rx = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = rx.wait_for(|stop| *stop).await;
                    })
                    .await
            }))
        }
        None => {
            info!("HTTP server disabled");
            None
        }
    };

    let restart_interval = Duration::from_secs(config.scheduler.restart_interval_secs);
    let scheduler = async {
        loop {
            match cycle.run_once().await {
                Ok(report) => state.record_run(report).await,
                Err(e) => error!(error = %e, "Run failed"),
            }
            info!(wait_secs = restart_interval.as_secs(), "Sleeping until next run");
            tokio::time::sleep(restart_interval).await;
        }
    };

    tokio::select! {
        _ = scheduler => {},
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = server_handle {
        match handle.await {
            Ok(Ok(())) => info!("Server stopped"),
            Ok(Err(e)) => warn!(error = %e, "Server exited with error"),
            Err(e) => warn!(error = %e, "Server task panicked"),
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Stdout logging plus an optional daily rolling JSON log file.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into());

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, "kinoscout.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
