//! Settings store interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error_handling::SettingsError;
use crate::jurisdiction::JurisdictionKey;

/// A boolean setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Master geolocation switch
    GeolocationEnabled,
    /// Resolve location through the client-initiated lookup instead of at render time
    AsyncMode,
    /// Verbose location diagnostics; also bypasses the location cookie
    LocationDebug,
    /// Kill switch that suppresses the consent tool everywhere
    DisableForTroubleshooting,
    DisableForLoggedIn,
    DisableForEditor,
    DisableForAdministrator,
    /// Hide the privacy-settings link while the tool is suppressed
    HidePrivacySettingsLink,
    /// Show the consent tool to visitors in this jurisdiction
    ShowIn(JurisdictionKey),
}

impl Setting {
    /// Persistent key of the setting.
    pub fn key(&self) -> String {
        match self {
            Setting::GeolocationEnabled => "geoip_enabled".to_string(),
            Setting::AsyncMode => "location_ajax".to_string(),
            Setting::LocationDebug => "location_debug".to_string(),
            Setting::DisableForTroubleshooting => "disable_troubleshooting".to_string(),
            Setting::DisableForLoggedIn => "disable_logged_in".to_string(),
            Setting::DisableForEditor => "disable_editor".to_string(),
            Setting::DisableForAdministrator => "disable_admin".to_string(),
            Setting::HidePrivacySettingsLink => "location_psl_hide".to_string(),
            Setting::ShowIn(key) => format!("show_in_{}", key),
        }
    }

    /// Effective value when the setting was never written.
    pub fn default_value(&self) -> bool {
        matches!(self, Setting::AsyncMode)
    }
}

/// One failed download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl DownloadErrorEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Typed access to persisted settings and shared download state.
///
/// Implementations serialize their own writes; callers tolerate lost
/// updates between processes.
pub trait SettingsStore: Send + Sync {
    /// Stored value, or `None` if the setting was never written.
    fn get_flag(&self, setting: Setting) -> Result<Option<bool>, SettingsError>;

    fn set_flag(&self, setting: Setting, value: bool) -> Result<(), SettingsError>;

    fn download_error_count(&self) -> Result<u32, SettingsError>;

    fn download_error_log(&self) -> Result<Vec<DownloadErrorEntry>, SettingsError>;

    /// Increments the error counter and appends to the log.
    ///
    /// Returns the new count.
    fn record_download_error(&self, entry: DownloadErrorEntry) -> Result<u32, SettingsError>;

    /// Clears the error counter and log, closing the circuit breaker.
    fn reset_download_errors(&self) -> Result<(), SettingsError>;

    /// Effective value of a flag; unreadable settings fall back to the default.
    fn flag(&self, setting: Setting) -> bool {
        match self.get_flag(setting) {
            Ok(value) => value.unwrap_or_else(|| setting.default_value()),
            Err(e) => {
                log::warn!("Failed to read setting {}: {}", setting.key(), e);
                setting.default_value()
            }
        }
    }
}
