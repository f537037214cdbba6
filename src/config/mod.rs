//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (thresholds, timeouts, cookie and parameter names)
//! - Client IP header name constants
//! - Library configuration and CLI option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Cli, Command, Config, LogFormat, LogLevel};
