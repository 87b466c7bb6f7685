use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tidings_client::{LexiconScorer, ReqwestFetcher, ScraperParser};
use tidings_core::{ArticleFetcher, EnrichmentService, IngestionService, PipelineConfig};
use tidings_server::pipeline;
use tidings_server::routes;
use tidings_server::state::AppState;
use tidings_store::{BlobClient, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tidings=info".parse()?))
        .with_target(false)
        .init();

    let port = std::env::var("TIDINGS_SERVER_PORT").unwrap_or_else(|_| "7071".to_string());
    let addr = format!("0.0.0.0:{port}");

    let config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;
    let store = BlobClient::new(StoreConfig::from_env().context("Invalid storage configuration")?);

    let articles = ArticleFetcher::new(
        ReqwestFetcher::new()?,
        ScraperParser::new(),
        config.source.clone(),
    );
    let ingestion = IngestionService::new(articles, store.clone(), config.raw_container.clone());
    let enrichment = EnrichmentService::new(
        LexiconScorer::new(),
        store.clone(),
        config.sentiment_container.clone(),
    );

    let cancel_token = CancellationToken::new();
    let handles = pipeline::spawn(
        &config,
        store.clone(),
        ingestion,
        enrichment,
        cancel_token.clone(),
    )
    .await;

    let state = Arc::new(AppState { store, config });
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    cancel_token.cancel();
    handles.join().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for CTRL+C");
            }
        }
        () = cancel_token.cancelled() => {}
    }
    tracing::info!("Shutdown signal received");
    cancel_token.cancel();
}
