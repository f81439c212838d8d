use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod dashboard;
mod predictor;

use config::Config;
use dashboard::AppState;
use predictor::{LinearRegressionModel, Predictor, ScoreModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Load the trained model once; it stays read-only for the process lifetime.
    let model = LinearRegressionModel::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path))?;
    info!(
        "Model loaded: {} ({} features, RMSE {})",
        model.name(),
        model.feature_count(),
        model
            .rmse()
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "n/a".into())
    );
    let predictor = Predictor::new(Arc::new(model))?;

    let app = dashboard::router(AppState { predictor });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Score predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
