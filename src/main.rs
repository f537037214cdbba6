//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_consent` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geo_consent::config::{Cli, Command};
use geo_consent::geoip::RefreshMode;
use geo_consent::initialization::init_logger_with;
use geo_consent::request::ErrorLatch;
use geo_consent::settings::{Setting, SettingsStore};
use geo_consent::{run_service, Config, Engine};

#[tokio::main]
async fn main() -> Result<()> {
    // CONSENT_SITE_DOMAIN and CONSENT_NONCE may come from .env
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.config();
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, config).await {
        eprintln!("geo_consent error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

/// Builds the engine for a one-shot command.
fn open_engine(config: &Config) -> Result<Engine> {
    let engine = Engine::from_config(config)?;
    engine.migrate().context("Failed to migrate settings")?;
    Ok(engine)
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Serve { .. } => run_service(config).await?,
        Command::Refresh => {
            let engine = open_engine(&config)?;
            if engine.database().downloads_suspended() {
                anyhow::bail!("Downloads are suspended after repeated errors; run reset-errors first");
            }
            if !engine.settings().flag(Setting::GeolocationEnabled) {
                anyhow::bail!("Geolocation is disabled in the settings; nothing to refresh");
            }
            let mut latch = ErrorLatch::new();
            if engine
                .database()
                .ensure_available(&mut latch, RefreshMode::Scheduled)
                .await
            {
                println!(
                    "✅ Location database installed at {}",
                    engine.database().path().display()
                );
            } else {
                anyhow::bail!("Location database refresh failed; see diagnostics for the error log");
            }
        }
        Command::Lookup { ip } => {
            let report = open_engine(&config)?
                .lookup(ip)
                .await
                .context("Failed to classify location")?;
            print!("{}", report);
        }
        Command::Diagnostics => {
            let state = open_engine(&config)?.database().state();
            let json = serde_json::to_string_pretty(&state)
                .context("Failed to serialize database state")?;
            println!("{}", json);
        }
        Command::ResetErrors => {
            open_engine(&config)?
                .database()
                .reset_download_errors()
                .context("Failed to reset download errors")?;
            println!("✅ Download error log cleared");
        }
    }
    Ok(())
}
