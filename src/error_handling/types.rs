//! Error type definitions.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for the settings store.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("Settings file error ({path}): {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The settings file does not contain valid settings JSON.
    #[error("Settings file is not valid JSON ({path}): {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory state lock was poisoned by a panicking writer.
    #[error("Settings lock poisoned")]
    LockPoisoned,
}

/// Error types for database downloads.
///
/// The numbered link errors are distinct failure modes of the signed link
/// request and keep their number in the persisted error log.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure while requesting the signed link.
    #[error("URL Lookup Error #1: {0}")]
    LinkRequest(#[source] ReqwestError),

    /// The licensing endpoint answered with a non-200 status.
    #[error("URL Lookup Error #2 ({status}): {reason}")]
    LinkStatus {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// The response body is not a JSON object.
    #[error("URL Lookup Error #3: Unable to process body; {0}")]
    LinkBody(String),

    /// The endpoint explicitly refused to hand out a link.
    #[error("URL Lookup Error #4: {0}")]
    LinkDenied(String),

    /// The endpoint reported success but sent no URL.
    #[error("URL Lookup Error #5: URL Empty{0}")]
    LinkEmpty(String),

    /// The destination directory does not accept new files.
    #[error("Download directory is not writable: {0}")]
    DirectoryNotWritable(PathBuf),

    /// Transport failure while fetching the database file.
    #[error("Download Error: {0}")]
    Transfer(#[source] ReqwestError),

    /// The file server answered with a non-success status.
    #[error("Download Error: HTTP {0}")]
    TransferStatus(u16),

    /// The payload exceeds the accepted size.
    #[error("Download Error: database too large ({size} bytes, max {max} bytes)")]
    TooLarge {
        /// Reported or received size
        size: u64,
        /// Accepted maximum
        max: u64,
    },

    /// The archive did not contain the expected database.
    #[error("Extract Error: {0}")]
    Extract(String),

    /// The downloaded file could not be installed.
    #[error("Save Error: {0}")]
    Save(#[from] std::io::Error),
}

/// Error types for location lookups.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The address is not a valid IPv4 or IPv6 address.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// The database file could not be read.
    #[error("Failed to read location database {path}: {source}")]
    Read {
        /// Database path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The reader rejected the database or the query.
    #[error("Location database error: {0}")]
    Reader(#[from] maxminddb::MaxMindDbError),
}

/// Error types for jurisdiction configuration.
///
/// These are programming/configuration mistakes, never visitor-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// A key string does not name any known jurisdiction.
    #[error("Unable to locate location key for {0}")]
    UnknownKey(String),

    /// A known key is absent from the configured registry.
    #[error("Jurisdiction {0} is not registered")]
    NotRegistered(String),

    /// Two registry entries share a key.
    #[error("Jurisdiction {0} is registered more than once")]
    DuplicateKey(String),
}
