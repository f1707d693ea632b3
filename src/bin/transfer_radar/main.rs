//! Transfer radar.
//!
//! This binary watches USDC transfers on several EVM chains and animates
//! them as radar blips, printing a summary of each chain to the terminal.

mod app;
mod config;
mod display;
mod error;

use std::process::exit;

use clap::Parser;
use tracing::error;

use app::RadarApp;
use config::{CliConfig, EnvConfig, RadarSettings};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let (env_config, settings) = match configure() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let endpoints = match env_config.endpoints(settings.chains.clone()) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!(%e, "Invalid RPC endpoint");
            exit(1);
        }
    };

    let mut app = RadarApp::start(settings, endpoints, env_config.radar_seed);
    let result = app.run().await;
    app.shutdown();

    if let Err(e) = result {
        error!(%e, "Transfer radar encountered an error, shutting down");
        exit(1);
    }
}

/// Environment and CLI configuration.
fn configure() -> error::Result<(EnvConfig, RadarSettings)> {
    let env_config = EnvConfig::from_env()?;
    let settings = CliConfig::parse().to_radar_settings()?;
    Ok((env_config, settings))
}
