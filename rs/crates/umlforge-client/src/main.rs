use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use umlforge_client::config::ClientConfig;
use umlforge_client::generator::GeneratorClient;
use umlforge_client::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,umlforge_client=debug,umlforge_core=debug")
        }))
        .init();

    let cfg = ClientConfig::from_env()?;
    let generator = Arc::new(GeneratorClient::from_config(&cfg)?);

    match generator.base_url() {
        Some(base) => {
            let healthy = generator.health().await;
            if healthy {
                tracing::info!(base, "generator reachable");
            } else {
                tracing::warn!(base, "generator health probe failed; requests may fail");
            }
        }
        None => tracing::warn!("UMLFORGE_SERVER_BASE_URL not set; every request will fail"),
    }
    if cfg.api_key.is_empty() {
        tracing::warn!("UMLFORGE_API_KEY not set; sending an empty key");
    }

    let state = Arc::new(AppState::new(&cfg, generator));
    let shutdown = state.dispatcher.shutdown_token();
    let app = server::router(state);

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("umlforge v{} on http://{}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler failed");
            }
            tracing::info!("shutting down");
            // Stops in-flight requests and ends open SSE streams.
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
