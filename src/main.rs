use anyhow::{Context, Result};
use calidad_agua::api::{create_router, AppState};
use calidad_agua::config;
use calidad_agua::powerbi::PowerBiAuth;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calidad_agua=info".into()),
        )
        .init();

    info!("Calidad de Agua starting...");

    let config_path =
        std::env::var("CALIDAD_AGUA_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::load(&config_path).context("Invalid configuration")?;

    info!(
        bind = %config.server.bind_address(),
        tenant_id = %config.powerbi.tenant_id,
        group_id = %config.report.group_id,
        report_id = %config.report.report_id,
        timeout_seconds = config.powerbi.timeout_seconds,
        "Configuration loaded"
    );

    // Token provider lives for the whole process; its cache is shared by all requests
    let powerbi = Arc::new(
        PowerBiAuth::new(
            config.powerbi.credentials(),
            config.powerbi.endpoints(),
            config.powerbi.timeout(),
        )
        .context("Failed to build HTTP client")?,
    );

    let router = create_router(AppState::new(powerbi, config.report.clone()));

    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address()))?;
    info!(address = %config.server.bind_address(), "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Calidad de Agua stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
