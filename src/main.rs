use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::FileArtifactSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Refuse to serve anything until both artifacts load cleanly
    let source = Arc::new(FileArtifactSource::from_config(&config));
    let state = AppState::load(source)
        .await
        .context("Failed to load recommender artifacts")?;

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
