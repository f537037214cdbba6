//! GeoIP data structures.
//!
//! This module defines the resolved visitor location and the observable state
//! of the local database.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::UNKNOWN_LOCATION;
use crate::settings::DownloadErrorEntry;

/// Approximate visitor location.
///
/// Every field is optional; an absent field means "unknown", never "nowhere".
/// Serialized with `state` as the wire name of the region, which is the
/// format stored in the location cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "state")]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl LocationRecord {
    /// True when nothing about the location is known.
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.region.is_none() && self.country.is_none()
    }

    /// Human readable location, e.g. `"Denver, Colorado United States"`.
    ///
    /// Returns `"Unknown"` when no field is resolved.
    pub fn display_name(&self) -> String {
        fn non_empty(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|v| !v.is_empty())
        }
        let city = non_empty(&self.city);
        let region = non_empty(&self.region);
        let country = non_empty(&self.country);
        if city.is_none() && region.is_none() && country.is_none() {
            return UNKNOWN_LOCATION.to_string();
        }

        let mut name = String::new();
        if let Some(city) = city {
            name.push_str(city);
            name.push_str(", ");
        }
        if let Some(region) = region {
            name.push_str(region);
            name.push(' ');
        }
        if let Some(country) = country {
            name.push_str(country);
        }
        name.trim().to_string()
    }
}

/// Observable state of the local location database.
#[derive(Debug, Clone, Serialize)]
pub struct GeoDatabaseState {
    pub path: PathBuf,
    pub exists: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub next_scheduled_refresh: Option<DateTime<Utc>>,
    pub download_error_count: u32,
    pub download_error_log: Vec<DownloadErrorEntry>,
    /// Whether the circuit breaker currently blocks downloads
    pub downloads_suspended: bool,
}
