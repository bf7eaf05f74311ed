//! trade-oracle server and CLI.
//!
//! # Usage
//! ```sh
//! MODE=binance PORT=5000 trade-oracle serve
//! trade-oracle predict --pair ETH/USDT
//! trade-oracle fit-scaler --pair BTC/USDT
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use trade_oracle::application::system::Application;
use trade_oracle::config::Config;
use trade_oracle::domain::trading::types::normalize_crypto_symbol;
use trade_oracle::interfaces::http::dto::PredictiveValuesResponse;
use trade_oracle::interfaces::http::router;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "AI price forecasts for crypto pairs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and the background trading loop (default)
    Serve,
    /// Run the pipeline once and print the forecast and advisory levels
    Predict {
        /// Trading pair, BASE/QUOTE or exchange form (BTCUSDT)
        #[arg(short, long, default_value = "BTC/USDT")]
        pair: String,
    },
    /// Refit and store the feature scaler for a pair
    FitScaler {
        /// Trading pair, BASE/QUOTE or exchange form (BTCUSDT)
        #[arg(short, long, default_value = "BTC/USDT")]
        pair: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        "trade-oracle {}: Mode={:?}, Timeframe={}, Pairs={:?}",
        env!("CARGO_PKG_VERSION"),
        config.exchange.mode,
        config.exchange.timeframe,
        config.server.supported_pairs
    );

    let app = Application::build(config).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(app).await,
        Commands::Predict { pair } => {
            let pair = normalize_crypto_symbol(&pair).map_err(anyhow::Error::msg)?;
            let intent = app.prediction_service.predictive_values(&pair).await?;
            let response = PredictiveValuesResponse::from(&intent);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Commands::FitScaler { pair } => {
            let pair = normalize_crypto_symbol(&pair).map_err(anyhow::Error::msg)?;
            let scaler = app.prediction_service.fit_scaler(&pair).await?;
            info!(
                "Scaler for {} fitted on {} rows ({} features)",
                pair,
                scaler.samples,
                scaler.columns.len()
            );
            Ok(())
        }
    }
}

async fn serve(app: Application) -> Result<()> {
    let address = app.config.server.listen_address();
    let handle = app.start();
    let mut shutdown = handle.shutdown_signal();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}. Press Ctrl+C to shutdown.", address);

    let server = axum::serve(listener, router(app.app_state())).with_graceful_shutdown(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Shutdown signal received."),
                    Err(e) => error!("Unable to listen for shutdown signal: {}", e),
                }
            }
            _ = shutdown.changed() => {}
        }
    });

    let result = server.await;
    handle.shutdown().await;
    result.context("HTTP server failed")
}
