//! Folio server binary: wire the stores, repository, service, and router
//! together, start the background refresh, and serve until shutdown.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folio_repo::ManifestRepository;
use folio_server::{router, AppState, Config};
use folio_service::TrackService;
use folio_store::{DurableStore, LocalReplica, MemoryStore, S3Config, S3Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let store: Arc<dyn DurableStore> = if config.memory_store {
        tracing::warn!("using the in-memory store; nothing will survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            S3Store::connect(S3Config {
                bucket: config.s3_bucket.clone(),
                region: config.s3_region.clone(),
                endpoint: config.s3_endpoint.clone(),
            })
            .await,
        )
    };

    let replica = LocalReplica::new(&config.replica_path);
    let repo = Arc::new(ManifestRepository::with_settings(
        Arc::clone(&store),
        replica,
        &config.manifest_key,
        config.refresh_interval(),
    ));
    let refresh = repo.start_auto_refresh();

    let service = Arc::new(TrackService::with_limits(
        Arc::clone(&repo),
        Arc::clone(&store),
        config.url_ttl(),
        config.write_timeout(),
    ));

    let app = router(AppState {
        service,
        repo: Arc::clone(&repo),
        store,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, "folio server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    refresh.shutdown().await;
    tracing::info!("folio server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
