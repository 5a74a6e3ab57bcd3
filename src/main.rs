// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::csv_repository::CsvDatasetRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    chart_description, health_check, index, select_chart, stylesheet, temperature_page,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agri_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    tracing::info!(
        "Temperature data: {}",
        config.data.resolve_data_path().display()
    );

    // Create repository (infrastructure layer)
    let repository = Arc::new(CsvDatasetRepository::new());

    // Create application state
    let state = Arc::new(AppState::new(&config, repository));

    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind address `{}`", config.server.bind))?;
    tracing::info!("Starting agri-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/styles.css", get(stylesheet))
        .route("/temperature", get(temperature_page))
        .route("/temperature/select", post(select_chart))
        .route("/temperature/chart", get(chart_description))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
