//! Location database lifecycle: download, install, error accounting.

mod download;
mod extract;
mod link;
mod manager;

pub use manager::{DatabaseManager, DatabaseManagerConfig, RefreshMode};
