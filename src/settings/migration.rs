//! One-shot settings migrations, run once at startup.

use crate::error_handling::SettingsError;
use crate::jurisdiction::JurisdictionRegistry;

use super::store::{Setting, SettingsStore};
use super::toggles::JurisdictionToggleSet;

/// Derives the master geolocation flag for installations that predate it.
///
/// If the flag was never written, it is set to whether any jurisdiction is
/// already toggled on. An explicit value is never touched.
///
/// Returns the effective flag value.
pub fn migrate_geolocation_flag(
    settings: &dyn SettingsStore,
    registry: &JurisdictionRegistry,
) -> Result<bool, SettingsError> {
    if let Some(enabled) = settings.get_flag(Setting::GeolocationEnabled)? {
        return Ok(enabled);
    }

    let enabled = JurisdictionToggleSet::load(settings, registry).any_shown();

    settings.set_flag(Setting::GeolocationEnabled, enabled)?;
    log::info!(
        "Derived geolocation setting from jurisdiction toggles: {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(enabled)
}
