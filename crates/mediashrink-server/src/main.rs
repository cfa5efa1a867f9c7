use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use mediashrink_observability::{init_tracing_with_config, LogConfig};
use mediashrink_server::{config, create_router, AppState, ServerArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    // Load configuration
    let config = config::load(&args).await?;

    // Setup tracing
    init_tracing_with_config(LogConfig::from_settings(
        &config.observability.log_level,
        &config.observability.log_format,
    )?)?;
    tracing::info!("Server configuration: {:?}", config);

    tracing::info!(
        "Scratch directory: {}",
        config.workspace.scratch_root.display()
    );

    let state = Arc::new(AppState::from_config(&config));
    let app = create_router(state);

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("MediaShrink server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
