//! Location database manager.
//!
//! Decides when the database must be downloaded and keeps the persistent
//! download error accounting. Once more than
//! [`DOWNLOAD_ERROR_THRESHOLD`](crate::config::DOWNLOAD_ERROR_THRESHOLD)
//! errors have been recorded, no download is attempted until an
//! administrator resets the counter.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::config::{Config, DOWNLOAD_ERROR_THRESHOLD};
use crate::error_handling::{DownloadError, InitializationError, SettingsError};
use crate::geoip::GeoDatabaseState;
use crate::initialization::{init_download_client, init_link_client};
use crate::request::ErrorLatch;
use crate::settings::{DownloadErrorEntry, Setting, SettingsStore};

use super::download::download_database;
use super::link::request_download_url;

/// Why the database is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// A visitor lookup needs the file; download only if it is missing.
    OnDemand,
    /// Periodic refresh; always download a fresh copy.
    Scheduled,
}

/// Where the database lives and how to obtain a download link.
#[derive(Debug, Clone)]
pub struct DatabaseManagerConfig {
    pub path: PathBuf,
    pub link_endpoint: String,
    pub download_source: String,
    /// Site host name, or a site URL whose host is used
    pub site_domain: String,
}

impl From<&Config> for DatabaseManagerConfig {
    fn from(config: &Config) -> Self {
        Self {
            path: config.database_path.clone(),
            link_endpoint: config.link_endpoint.clone(),
            download_source: config.download_source.clone(),
            site_domain: config.site_domain.clone(),
        }
    }
}

/// Reduces `https://example.com/path` to `example.com`; bare hosts pass through.
fn site_host(site_domain: &str) -> String {
    match url::Url::parse(site_domain) {
        Ok(url) => match url.host_str() {
            Some(host) => host.to_string(),
            None => site_domain.to_string(),
        },
        Err(_) => site_domain.trim().to_string(),
    }
}

pub struct DatabaseManager {
    config: DatabaseManagerConfig,
    settings: Arc<dyn SettingsStore>,
    link_client: reqwest::Client,
    download_client: reqwest::Client,
    next_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl DatabaseManager {
    /// Creates a manager with the default HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if a client cannot be built.
    pub fn new(
        config: DatabaseManagerConfig,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, InitializationError> {
        Ok(Self::with_clients(
            config,
            settings,
            init_link_client()?,
            init_download_client()?,
        ))
    }

    pub fn with_clients(
        config: DatabaseManagerConfig,
        settings: Arc<dyn SettingsStore>,
        link_client: reqwest::Client,
        download_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            settings,
            link_client,
            download_client,
            next_refresh: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Whether the database file exists and can be opened.
    pub fn is_available(&self) -> bool {
        std::fs::File::open(&self.config.path).is_ok()
    }

    fn download_error_count(&self) -> u32 {
        self.settings.download_error_count().unwrap_or_else(|e| {
            log::warn!("Failed to read download error count: {}", e);
            0
        })
    }

    /// Whether the circuit breaker currently blocks downloads.
    pub fn downloads_suspended(&self) -> bool {
        self.download_error_count() > DOWNLOAD_ERROR_THRESHOLD
    }

    /// Makes sure the database is present, downloading it when needed.
    ///
    /// Returns false without doing anything when downloads are suspended or
    /// geolocation is disabled. Otherwise downloads if the file is missing or
    /// `mode` is [`RefreshMode::Scheduled`], and returns whether the file is
    /// available afterwards. Never fails; errors are recorded instead.
    pub async fn ensure_available(&self, latch: &mut ErrorLatch, mode: RefreshMode) -> bool {
        if self.downloads_suspended() {
            log::debug!(
                "Location database downloads suspended after {} errors",
                self.download_error_count()
            );
            return false;
        }
        if !self.settings.flag(Setting::GeolocationEnabled) {
            return false;
        }

        if mode == RefreshMode::Scheduled || !self.config.path.exists() {
            if let Some(parent) = self.config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        log::warn!("Failed to create {}: {}", parent.display(), e);
                    }
                }
            }
            self.download(latch).await;
        }

        self.is_available()
    }

    /// Requests a signed link and installs a fresh database.
    ///
    /// Skipped when an error was already recorded in this context.
    pub async fn download(&self, latch: &mut ErrorLatch) -> bool {
        if latch.is_set() {
            return false;
        }

        let domain = site_host(&self.config.site_domain);
        let signed_url = match request_download_url(
            &self.link_client,
            &self.config.link_endpoint,
            &self.config.download_source,
            &domain,
        )
        .await
        {
            Ok(url) => url,
            Err(e) => {
                self.log_download_error(latch, &e);
                return false;
            }
        };

        log::info!(
            "Downloading location database to {}",
            self.config.path.display()
        );
        match download_database(&self.download_client, &signed_url, &self.config.path).await {
            Ok(()) => self.is_available(),
            Err(e) => {
                self.log_download_error(latch, &e);
                false
            }
        }
    }

    /// Records the first download error of a context; later ones are dropped.
    fn log_download_error(&self, latch: &mut ErrorLatch, error: &DownloadError) {
        if latch.is_set() {
            return;
        }
        latch.set();

        log::error!("Location database download failed: {}", error);
        match self
            .settings
            .record_download_error(DownloadErrorEntry::now(error.to_string()))
        {
            Ok(count) if count > DOWNLOAD_ERROR_THRESHOLD => log::warn!(
                "{} download errors recorded; downloads suspended until reset",
                count
            ),
            Ok(_) => {}
            Err(e) => log::warn!("Failed to record download error: {}", e),
        }
    }

    /// Clears the error counter and log, closing the circuit breaker.
    pub fn reset_download_errors(&self) -> Result<(), SettingsError> {
        self.settings.reset_download_errors()?;
        log::info!("Location database download errors reset");
        Ok(())
    }

    pub fn next_scheduled_refresh(&self) -> Option<DateTime<Utc>> {
        self.next_refresh.read().ok().and_then(|next| *next)
    }

    pub(crate) fn set_next_scheduled_refresh(&self, at: Option<DateTime<Utc>>) {
        if let Ok(mut next) = self.next_refresh.write() {
            *next = at;
        }
    }

    /// Snapshot for diagnostics.
    pub fn state(&self) -> GeoDatabaseState {
        let metadata = std::fs::metadata(&self.config.path).ok();
        let download_error_log = self.settings.download_error_log().unwrap_or_else(|e| {
            log::warn!("Failed to read download error log: {}", e);
            Vec::new()
        });
        GeoDatabaseState {
            path: self.config.path.clone(),
            exists: metadata.is_some(),
            last_modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            next_scheduled_refresh: self.next_scheduled_refresh(),
            download_error_count: self.download_error_count(),
            download_error_log,
            downloads_suspended: self.downloads_suspended(),
        }
    }
}
