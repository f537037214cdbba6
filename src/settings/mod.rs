//! Settings and persistent state.
//!
//! Core logic never reads ambient global state: every setting goes through
//! an injected [`SettingsStore`], which also owns the download error counter
//! and log shared between requests.

mod json;
mod migration;
mod store;
mod toggles;

// Re-export public API
pub use json::JsonSettings;
pub use migration::migrate_geolocation_flag;
pub use store::{DownloadErrorEntry, Setting, SettingsStore};
pub use toggles::JurisdictionToggleSet;
