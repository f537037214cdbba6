//! Configuration constants.
//!
//! This module defines the constants used throughout the engine: download
//! thresholds and timeouts, file and cookie names, and debug parameter names.

use std::time::Duration;

// Location database lifecycle
/// Download error count above which no further download is attempted.
/// The breaker opens once the persisted count exceeds this value and stays
/// open until an administrator resets the counter.
pub const DOWNLOAD_ERROR_THRESHOLD: u32 = 5;

/// Interval between scheduled database refreshes (one month of 30 days)
pub const DATABASE_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Timeout for the signed download link request in seconds
pub const LINK_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the database file download in seconds (5 minutes for large file)
pub const DATABASE_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Maximum accepted database download size in bytes (200MB)
pub const MAX_DATABASE_DOWNLOAD_SIZE: u64 = 200 * 1024 * 1024;

/// Licensing endpoint that hands out signed, time-limited database links
pub const DEFAULT_LINK_ENDPOINT: &str = "https://app.termageddon.com/requestGeoIpDownloadLink";

/// Identifier sent as the `source` parameter of the link request
pub const DEFAULT_DOWNLOAD_SOURCE: &str = "geo_consent";

/// MaxMind edition stored on disk
pub const DATABASE_EDITION: &str = "GeoLite2-City";

/// Default location of the database file
pub const DEFAULT_DATABASE_PATH: &str = "./geoip/GeoLite2-City.mmdb";

/// Permissions applied to a freshly installed database file
#[cfg(unix)]
pub const DATABASE_FILE_MODE: u32 = 0o644;

// IP resolution
/// Address used when the connection carries no remote address at all
pub const PLACEHOLDER_REMOTE_ADDR: &str = "1.1.1.1";

/// Loopback address that is never looked up
pub const LOOPBACK_SENTINEL: &str = "::1";

/// Substrings stripped from the resolved address (IPv4-mapped prefix, varnish loopback hop)
pub const STRIPPED_IP_ARTIFACTS: &[&str] = &["::ffff:", ", 127.0.0.1"];

/// Reference addresses substituted for the named-location debug override
pub const DEBUG_LOCATION_IPS: &[(&str, &str)] = &[
    ("colorado", "73.14.194.136"),
    ("california", "149.142.201.252"),
    ("canada", "24.51.224.0"),
    ("denmark", "2.111.255.255"),
    ("england", "217.61.20.213"),
    ("wales", "89.241.3.226"),
    ("france", "194.177.63.255"),
];

// Location cache
/// Cookie caching the resolved location for render-time delivery
pub const SYNC_LOCATION_COOKIE: &str = "consent-geoip";
/// Cookie caching the resolved location for client-initiated delivery
pub const ASYNC_LOCATION_COOKIE: &str = "consent-geoip-ajax";
/// Path attribute of the location cookie
pub const LOCATION_COOKIE_PATH: &str = "/";

// Request parameters
/// Query parameter that force-enables the consent tool
pub const FORCE_ENABLE_PARAM: &str = "enable-consent";
/// Query parameter naming a debug location
pub const LOCATION_DEBUG_PARAM: &str = "consent-debug";
/// Request-forgery token parameter of the asynchronous lookup
pub const NONCE_PARAM: &str = "nonce";
/// Location override parameter of the asynchronous lookup
pub const LOCATION_OVERRIDE_PARAM: &str = "location";

/// Placeholder shown for unresolved location fields in debug output
pub const UNKNOWN_LOCATION: &str = "Unknown";

// Service
/// Default port of the decision service
pub const DEFAULT_PORT: u16 = 8787;
