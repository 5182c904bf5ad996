//! parcelscope server entry point.
//!
//! Boots the cache, the headless browser and the periodic flusher, then serves
//! either the HTTP API or the MCP tools on stdio depending on `transport`.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use parcelscope_client::{CarrierClient, HeadlessRenderer, RenderOptions};
use parcelscope_core::cache::flusher;
use parcelscope_core::{AppConfig, Cache, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use crate::service::QueryService;

mod error;
mod handler;
mod http;
mod service;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(transport = ?config.transport, cache = %config.cache_path.display(), "starting parcelscope server");

    let cache = Cache::open(&config.cache_path).await;
    let renderer = Arc::new(HeadlessRenderer::launch(&config).await?);
    let fetcher = match CarrierClient::new(renderer.clone(), config.carrier.clone(), RenderOptions::from_config(&config)) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            renderer.close().await;
            return Err(e.into());
        }
    };
    let service = Arc::new(QueryService::new(cache.clone(), Arc::new(fetcher)));
    let flusher = flusher::spawn(cache, config.flush_interval());

    let served = match config.transport {
        Transport::Http => serve_http(&config, service).await,
        Transport::Stdio => serve_stdio(service).await,
    };

    flusher.shutdown().await;
    renderer.close().await;

    served
}

async fn serve_http(config: &AppConfig, service: Arc<QueryService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, http::make_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn serve_stdio(service: Arc<QueryService>) -> Result<()> {
    tracing::info!("serving MCP tools on stdio transport");

    let handler = handler::ParcelScopeServer::new(service);
    let server = serve_server(handler, stdio()).await?;

    tokio::select! {
        quit = server.waiting() => { quit?; }
        _ = shutdown_signal() => {}
    }

    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
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
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
