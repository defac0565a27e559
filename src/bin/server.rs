//! # Tasker Dispatch Server
//!
//! Standalone binary serving the dispatch HTTP surface.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin tasker-dispatch-server
//!
//! # Run with a specific environment and config file
//! TASKER_ENV=production TASKER_DISPATCH_CONFIG=/etc/tasker/dispatch.toml \
//!     cargo run --bin tasker-dispatch-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use tasker_dispatch::config::ConfigManager;
use tasker_dispatch::database::{DatabaseConnection, PgTaskRepository, TaskRepository};
use tasker_dispatch::events::UpdateStream;
use tasker_dispatch::logging;
use tasker_dispatch::messaging::{KeyValueChannel, RedisChannel};
use tasker_dispatch::orchestration::{StartTimeWriter, TaskStarter};
use tasker_dispatch::services::{
    CommandService, HttpSchedulerClient, SchedulerClient, TaskQueryService,
};
use tasker_dispatch::web::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_manager = ConfigManager::load().context("failed to load configuration")?;
    let config = config_manager.config();

    logging::init_structured_logging(config_manager.environment(), &config.logging);

    info!("Starting Tasker Dispatch Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Environment: {}", config_manager.environment());
    info!("   Config: {}", config_manager.config_path().display());

    let redis = RedisChannel::from_config(&config.redis)
        .await
        .context("failed to connect to redis")?;
    if !redis.ping().await.context("redis did not answer PING")? {
        anyhow::bail!("unexpected PING reply from redis");
    }
    let channel: Arc<dyn KeyValueChannel> = Arc::new(redis);

    let database = DatabaseConnection::from_config(&config.database)
        .await
        .context("failed to connect to database")?;
    let repository: Arc<dyn TaskRepository> =
        Arc::new(PgTaskRepository::new(database.pool().clone()));

    let scheduler: Arc<dyn SchedulerClient> = Arc::new(
        HttpSchedulerClient::from_config(&config.scheduler)
            .context("failed to build scheduler client")?,
    );

    let (start_time_writer, writer_handle) = StartTimeWriter::spawn(
        Arc::clone(&repository),
        config.orchestration.start_time_grace(),
    );

    let state = AppState::new(
        TaskStarter::new(Arc::clone(&channel), Arc::clone(&repository), start_time_writer),
        UpdateStream::new(Arc::clone(&channel)).with_buffer(config.streaming.output_buffer),
        TaskQueryService::new(Arc::clone(&channel), repository, scheduler),
        CommandService::new(channel),
        config_manager.environment(),
    );

    let shutdown = CancellationToken::new();
    let state = state.with_shutdown(shutdown.clone());

    let listener = tokio::net::TcpListener::bind(config.web.bind_address.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.web.bind_address))?;
    info!("   Listening on {}", config.web.bind_address);
    info!("   Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, web::create_router(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Ends open update streams so their connections can drain
            shutdown.cancel();
        })
        .await
        .context("web server failed")?;

    info!("Shutdown signal received, draining pending start times...");

    // The router held the last writer handle; the worker exits once its queue is drained
    if let Err(e) = writer_handle.await {
        error!("Start time writer stopped abnormally: {}", e);
    }

    database.close().await;
    info!("Tasker Dispatch Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
