//! Service wiring and runtime lifecycle.
//!
//! Opens the store, starts the deletion worker, serves HTTP until a shutdown
//! signal arrives, then drains the worker and closes the store.

use crate::application::services::{LinkService, OwnerService};
use crate::config::{CodeStrategy, Config};
use crate::domain::deletion_worker::DeletionPipeline;
use crate::infrastructure::persistence::open_store;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator, UuidCodeGenerator};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs the service with the given configuration.
///
/// Initializes:
/// - Link store (journal replay or PostgreSQL ping + migrations)
/// - Code generator and link service
/// - Background deletion worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened or does not answer a ping
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = open_store(&config.storage, &config.pool_settings())
        .await
        .context("Failed to open link store")?;
    store.ping().await.context("Link store is unavailable")?;

    let generator: Arc<dyn CodeGenerator> = match config.code_strategy {
        CodeStrategy::Random => Arc::new(RandomCodeGenerator::new(config.code_length)),
        CodeStrategy::Uuid => Arc::new(UuidCodeGenerator),
    };
    let link_service = Arc::new(LinkService::with_max_attempts(
        Arc::clone(&store),
        generator,
        config.code_max_attempts,
    ));
    let owner_service = Arc::new(
        OwnerService::new(&config.owner_cookie_secret)
            .map_err(|e| anyhow::anyhow!("Failed to initialize cookie signing: {e}"))?,
    );

    let shutdown = CancellationToken::new();
    let deletion = DeletionPipeline::new(Arc::clone(&store), config.deletion_config());
    let worker = deletion.start(shutdown.clone())?;

    let state = AppState::new(
        link_service,
        deletion.clone(),
        owner_service,
        config.base_url.clone(),
        config.delete_enqueue_timeout(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    tokio::spawn(watch_signals(shutdown.clone()));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await;

    tracing::info!("HTTP server stopped, draining deletion queue");
    deletion.close();
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Deletion worker panicked");
    }

    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "Failed to close link store");
    }
    tracing::info!("Shutdown complete");

    served.map_err(Into::into)
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = shutdown.cancelled() => return,
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
