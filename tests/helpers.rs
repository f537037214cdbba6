// Shared test helpers: an engine over a fake location source.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geo_consent::error_handling::LookupError;
use geo_consent::geoip::LocationSource;
use geo_consent::settings::{JsonSettings, Setting, SettingsStore};
use geo_consent::{Config, Engine, JurisdictionKey, LocationRecord};
use tempfile::TempDir;

/// Answers for the reference addresses used across the tests.
#[derive(Default)]
pub struct FakeLocations {
    calls: AtomicUsize,
}

impl FakeLocations {
    #[allow(dead_code)] // Used by other test files
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocationSource for FakeLocations {
    fn locate(&self, _path: &Path, ip: &str) -> Result<LocationRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (city, region, country) = match ip {
            "73.14.194.136" => ("Denver", "Colorado", "United States"),
            "194.177.63.255" => ("Paris", "Île-de-France", "France"),
            "200.147.67.142" => ("São Paulo", "Sao Paulo", "Brazil"),
            "217.61.20.213" => ("London", "England", "United Kingdom"),
            _ => return Ok(LocationRecord::default()),
        };
        Ok(LocationRecord {
            city: Some(city.to_string()),
            region: Some(region.to_string()),
            country: Some(country.to_string()),
        })
    }
}

pub struct TestEngine {
    pub _temp_dir: TempDir,
    pub settings: Arc<JsonSettings>,
    #[allow(dead_code)] // Used by other test files
    pub locations: Arc<FakeLocations>,
    pub engine: Engine,
}

/// Engine with an installed database, geolocation on and only the EU shown.
///
/// The link endpoint points at `link_endpoint`, or at a closed port.
pub fn test_engine(link_endpoint: Option<String>) -> TestEngine {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let database_path = temp_dir.path().join("GeoLite2-City.mmdb");
    std::fs::write(&database_path, "database").expect("Failed to write database");

    let config = Config {
        database_path,
        site_domain: "https://shop.example.com/".to_string(),
        link_endpoint: link_endpoint.unwrap_or_else(|| "http://127.0.0.1:9/link".to_string()),
        ..Default::default()
    };

    let settings = Arc::new(JsonSettings::in_memory());
    settings
        .set_flag(Setting::ShowIn(JurisdictionKey::Eu), true)
        .expect("Failed to set flag");
    let locations = Arc::new(FakeLocations::default());
    let engine = Engine::with_parts(&config, settings.clone(), locations.clone())
        .expect("Failed to build engine");
    engine.migrate().expect("Failed to migrate settings");
    settings
        .set_flag(Setting::AsyncMode, false)
        .expect("Failed to set flag");

    TestEngine {
        _temp_dir: temp_dir,
        settings,
        locations,
        engine,
    }
}

/// Serves the engine on an ephemeral port.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_service(engine: &Engine, nonce: Option<&str>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local address");
    let state = engine.app_state(nonce);
    tokio::spawn(async move {
        if let Err(e) = geo_consent::server::serve_on(listener, state).await {
            eprintln!("service error: {}", e);
        }
    });
    addr
}
