//! HTTP client initialization.
//!
//! The licensing endpoint and the database file server get separate clients
//! because the file transfer needs a much longer timeout.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{DATABASE_DOWNLOAD_TIMEOUT_SECS, LINK_REQUEST_TIMEOUT_SECS};

fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Initializes the client used for the signed download link request.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_link_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(LINK_REQUEST_TIMEOUT_SECS))
        .user_agent(user_agent())
        .build()
}

/// Initializes the client used to fetch the database file.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_download_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(DATABASE_DOWNLOAD_TIMEOUT_SECS))
        .user_agent(user_agent())
        .build()
}
