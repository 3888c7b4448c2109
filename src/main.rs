use std::net::SocketAddr;
use std::path::PathBuf;

use notes::config::Configuration;
use notes::telemetry;
use opentelemetry::global;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The exporters depend on the file, so it is read under a console
    // subscriber of its own.
    let config = tracing::subscriber::with_default(telemetry::bootstrap_subscriber(), || {
        Configuration::default()
            .path(std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_default())
            .read()
    });
    let settings = config.telemetry.clone().unwrap_or_default();

    let (otlp_logs, logger) = match settings.otlp.as_deref() {
        Some(endpoint) => {
            let (bridge, provider) = telemetry::setup_logging(endpoint)?;
            (Some(bridge), Some(provider))
        },
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(telemetry::env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(otlp_logs)
        .init();

    let tracer = match settings.otlp.as_deref() {
        Some(endpoint) => {
            let provider = telemetry::setup_tracer(endpoint)?;
            global::set_tracer_provider(provider.clone());
            Some(provider)
        },
        None => None,
    };

    if let Some(port) = settings.metrics_port {
        let handle = telemetry::setup_metrics_recorder()?;
        let addr: SocketAddr = format!("{}:{port}", config.address).parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "metrics exposed");

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, telemetry::metrics_router(handle)).await {
                tracing::error!(error = %err, "metrics server stopped");
            }
        });
    }

    let addr: SocketAddr = format!("{}:{}", config.address, config.port).parse()?;
    let timeout = config.timeout();
    let state = notes::initialize_state(config).await;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server started");

    notes::server::serve(listener, notes::app(state), timeout, shutdown_signal()).await;

    if let Some(provider) = tracer {
        if let Err(err) = provider.shutdown() {
            tracing::error!(error = ?err, "cannot flush traces");
        }
    }
    if let Some(provider) = logger {
        if let Err(err) = provider.shutdown() {
            tracing::error!(error = ?err, "cannot flush logs");
        }
    }

    Ok(())
}
