//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_DOWNLOAD_SOURCE, DEFAULT_LINK_ENDPOINT, DEFAULT_PORT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use geo_consent::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     database_path: PathBuf::from("/var/lib/consent/GeoLite2-City.mmdb"),
///     site_domain: "example.com".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// JSON settings file; settings live in memory when absent
    pub settings_path: Option<PathBuf>,

    /// Location of the GeoLite2-City database file
    pub database_path: PathBuf,

    /// Host name sent to the licensing endpoint
    pub site_domain: String,

    /// Signed download link endpoint
    pub link_endpoint: String,

    /// `source` identifier sent to the licensing endpoint
    pub download_source: String,

    /// Port of the decision service
    pub port: u16,

    /// Request-forgery token expected by the asynchronous lookup
    pub nonce: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            settings_path: None,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            site_domain: "localhost".to_string(),
            link_endpoint: DEFAULT_LINK_ENDPOINT.to_string(),
            download_source: DEFAULT_DOWNLOAD_SOURCE.to_string(),
            port: DEFAULT_PORT,
            nonce: None,
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Serve decisions, refreshing the database monthly
/// geo_consent serve --settings ./consent.json --site-domain example.com
///
/// # Force a database download now
/// geo_consent refresh --settings ./consent.json
///
/// # Resolve one address against the local database
/// geo_consent lookup 81.2.69.142
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "geo_consent",
    about = "Geolocation-gated consent script decisions."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Settings file (JSON). Created on first write.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// GeoLite2-City database path
    #[arg(long, default_value = DEFAULT_DATABASE_PATH, global = true)]
    pub database: PathBuf,

    /// Site host name reported to the licensing endpoint
    #[arg(long, env = "CONSENT_SITE_DOMAIN", default_value = "localhost", global = true)]
    pub site_domain: String,

    /// Signed download link endpoint
    #[arg(long, default_value = DEFAULT_LINK_ENDPOINT, global = true)]
    pub link_endpoint: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the CLI.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the decision service and the monthly database refresh
    Serve {
        /// Port to listen on (127.0.0.1)
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Request-forgery token expected by the asynchronous lookup
        #[arg(long, env = "CONSENT_NONCE")]
        nonce: Option<String>,
    },
    /// Download the database now, even if it already exists
    Refresh,
    /// Resolve an address and print its jurisdictions
    Lookup {
        /// Address to resolve
        ip: IpAddr,
    },
    /// Print database state and download error log
    Diagnostics,
    /// Clear the download error counter and log
    ResetErrors,
}

impl Cli {
    /// Builds the library configuration from parsed options.
    pub fn config(&self) -> Config {
        let (port, nonce) = match &self.command {
            Command::Serve { port, nonce } => (*port, nonce.clone()),
            _ => (DEFAULT_PORT, None),
        };
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            settings_path: self.settings.clone(),
            database_path: self.database.clone(),
            site_domain: self.site_domain.clone(),
            link_endpoint: self.link_endpoint.clone(),
            download_source: DEFAULT_DOWNLOAD_SOURCE.to_string(),
            port,
            nonce,
        }
    }
}
