//! Error types.
//!
//! Errors are grouped by the boundary that produces them:
//! - **Initialization**: logger and HTTP client setup
//! - **Settings**: persistence of the settings store
//! - **Download**: signed link request, file transfer and installation;
//!   always converted to a logged failure by the database manager
//! - **Lookup**: reader failures; always resolved to an empty location
//! - **Classification**: configuration mistakes in the jurisdiction table

mod types;

// Re-export public API
pub use types::{
    ClassificationError, DownloadError, InitializationError, LookupError, SettingsError,
};
