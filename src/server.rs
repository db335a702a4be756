use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::common::{AnyResult, FetchConfig};
use crate::configs::Config;
use crate::resolver::Resolver;
use crate::rest;

/// Shared, immutable per-process state. Requests never mutate it, so the
/// service scales by running them concurrently without locking.
pub struct AppState {
    pub resolver: Resolver,
    /// Client for the availability probe endpoint.
    pub probe: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> AnyResult<Self> {
        Ok(Self {
            resolver: Resolver::new(config)?,
            probe: FetchConfig::from_config(&config.fetch).client()?,
        })
    }
}

pub async fn serve(config: Config) -> AnyResult<()> {
    let state = Arc::new(AppState::new(&config)?);
    info!("Registered sources: {:?}", state.resolver.adapter_names());

    let app = Router::new()
        .merge(rest::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("vidlink listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", e);
        return;
    }
    info!("shutdown signal received");
}
