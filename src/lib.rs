//! geo_consent library: geolocation-gated consent script decisions
//!
//! Decides, per visitor request, whether a site's privacy-consent tool should
//! be shown. The visitor's address is resolved through proxy headers, located
//! with a MaxMind GeoLite2-City database that is downloaded and refreshed on
//! demand, cached in a session cookie, and classified into privacy
//! jurisdictions. The consent tool is shown whenever the visitor may be in a
//! jurisdiction the site owner enabled.
//!
//! # Example
//!
//! ```no_run
//! use geo_consent::{Config, Engine};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     site_domain: "example.com".to_string(),
//!     ..Default::default()
//! };
//!
//! let engine = Engine::from_config(&config)?;
//! engine.migrate()?;
//! let report = engine.lookup("81.2.69.142".parse()?).await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Database downloads and the HTTP
//! service run on it.

mod app;
pub mod config;
pub mod error_handling;
pub mod gate;
pub mod geoip;
pub mod initialization;
pub mod jurisdiction;
pub mod location;
pub mod request;
pub mod server;
pub mod settings;

// Re-export public API
pub use app::{run_service, Engine, LookupReport};
pub use config::{Config, LogFormat, LogLevel};
pub use gate::{ConsentGate, RenderDecision, SuppressReason};
pub use geoip::{GeoDatabaseState, LocationRecord};
pub use jurisdiction::{JurisdictionKey, JurisdictionRegistry};
