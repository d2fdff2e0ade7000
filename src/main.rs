use anyhow::Context;
use embedding_service::api::{create_router, AppState};
use embedding_service::infrastructure::{create_encoder, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "embedding_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    info!(
        provider = ?config.embedding.provider,
        model = %config.embedding.model,
        dimension = config.embedding.dimension,
        "Configuration loaded"
    );

    // The listener is only bound once the model is usable.
    let embedding_config = config.embedding.clone();
    let encoder = tokio::task::spawn_blocking(move || create_encoder(&embedding_config))
        .await?
        .context("Failed to initialize encoder")?;

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("server.host must be an IP address")?,
        config.server.port,
    );

    let state = AppState::new(encoder, config);
    let app = create_router(state);

    info!("Embedding service listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Embedding service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
