//! Engine assembly and the operations behind each CLI command.

mod report;

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, DATABASE_REFRESH_INTERVAL};
use crate::error_handling::{ClassificationError, SettingsError};
use crate::gate::ConsentGate;
use crate::geoip::{
    spawn_refresh_job, DatabaseManager, DatabaseManagerConfig, LocationSource, MaxMindReader,
};
use crate::jurisdiction::{classify_all, JurisdictionRegistry};
use crate::location::LocationResolver;
use crate::request::{DeliveryMode, RequestContext};
use crate::server::{start_server, AcceptAnyNonce, AppState, NonceVerifier, SharedSecretNonce};
use crate::settings::{migrate_geolocation_flag, JsonSettings, SettingsStore};

pub use report::LookupReport;

/// Every long-lived component, wired from one [`Config`].
pub struct Engine {
    settings: Arc<dyn SettingsStore>,
    database: Arc<DatabaseManager>,
    gate: Arc<ConsentGate>,
}

impl Engine {
    /// Opens the settings file (or in-memory settings) and builds the engine
    /// around the MaxMind reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or an HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings: Arc<dyn SettingsStore> = match &config.settings_path {
            Some(path) => Arc::new(
                JsonSettings::open(path)
                    .with_context(|| format!("Failed to open settings {}", path.display()))?,
            ),
            None => {
                log::info!("No settings file configured; settings are kept in memory");
                Arc::new(JsonSettings::in_memory())
            }
        };
        Self::with_parts(config, settings, Arc::new(MaxMindReader::new()))
    }

    /// Builds the engine around caller-provided settings and location source.
    pub fn with_parts(
        config: &Config,
        settings: Arc<dyn SettingsStore>,
        source: Arc<dyn LocationSource>,
    ) -> Result<Self> {
        let database = Arc::new(
            DatabaseManager::new(DatabaseManagerConfig::from(config), settings.clone())
                .context("Failed to initialize HTTP clients")?,
        );
        let registry = Arc::new(JurisdictionRegistry::standard());
        let locations = LocationResolver::new(settings.clone(), database.clone(), source);
        let gate = Arc::new(ConsentGate::new(registry, settings.clone(), locations));

        Ok(Self {
            settings,
            database,
            gate,
        })
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn database(&self) -> &Arc<DatabaseManager> {
        &self.database
    }

    pub fn gate(&self) -> &Arc<ConsentGate> {
        &self.gate
    }

    /// Runs the one-shot settings migrations. Returns the effective
    /// geolocation flag.
    pub fn migrate(&self) -> Result<bool, SettingsError> {
        migrate_geolocation_flag(self.settings.as_ref(), self.gate.registry())
    }

    /// Service state, verifying `nonce` when one is configured.
    pub fn app_state(&self, nonce: Option<&str>) -> AppState {
        let nonce: Arc<dyn NonceVerifier> = match nonce {
            Some(secret) => Arc::new(SharedSecretNonce::new(secret)),
            None => {
                log::warn!("No lookup nonce configured; any nonce value is accepted");
                Arc::new(AcceptAnyNonce)
            }
        };
        AppState {
            gate: self.gate.clone(),
            nonce,
        }
    }

    /// Resolves one address outside any browser session.
    ///
    /// No cookie is read or written.
    pub async fn lookup(&self, ip: IpAddr) -> Result<LookupReport, ClassificationError> {
        let ip = ip.to_string();
        let mut ctx = RequestContext::new(DeliveryMode::Synchronous).with_remote_addr(ip.clone());
        ctx.headers_sent = true;

        let location = self.gate.locations().lookup(&mut ctx, &ip).await;
        Ok(LookupReport {
            hide: self.gate.should_hide_at(&location)?,
            jurisdictions: classify_all(self.gate.registry(), &location),
            location: location.display_name(),
            ip,
            errors: ctx.debug_messages().to_vec(),
        })
    }
}

/// Runs the decision service with the monthly database refresh.
///
/// Settings migrations run before the first request is served. Returns when
/// the service shuts down.
///
/// # Errors
///
/// Returns an error if the engine cannot be built, a migration fails or the
/// port cannot be bound.
pub async fn run_service(config: Config) -> Result<()> {
    let engine = Engine::from_config(&config)?;
    let enabled = engine.migrate().context("Failed to migrate settings")?;
    log::info!(
        "Geolocation {}; database at {}",
        if enabled { "enabled" } else { "disabled" },
        engine.database().path().display()
    );

    let refresh = spawn_refresh_job(engine.database().clone(), DATABASE_REFRESH_INTERVAL);
    let result = start_server(config.port, engine.app_state(config.nonce.as_deref())).await;
    refresh.abort();
    result
}
