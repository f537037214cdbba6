//! Location database.
//!
//! This module owns the local MaxMind GeoLite2-City file:
//! - Reading it (with an in-memory reader reopened when the file changes)
//! - Downloading it through a signed, time-limited link
//! - Tracking download failures behind a persistent circuit breaker
//! - Refreshing it on a monthly schedule
//!
//! Failures never reach visitors: a missing or unreadable database resolves
//! every address to an empty [`LocationRecord`].

mod database;
mod reader;
mod schedule;
mod types;

// Re-export public API
pub use database::{DatabaseManager, DatabaseManagerConfig, RefreshMode};
pub use reader::{LocationSource, MaxMindReader};
pub use schedule::spawn_refresh_job;
pub use types::{GeoDatabaseState, LocationRecord};
