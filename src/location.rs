//! Visitor location resolution with a per-session cookie cache.
//!
//! A location is looked up in the database at most once per browser session
//! and delivery mode; afterwards it is read back from the location cookie.
//! Every failure degrades to an empty (unknown) location.

use std::sync::Arc;

use crate::config::LOOPBACK_SENTINEL;
use crate::geoip::{DatabaseManager, LocationRecord, LocationSource, RefreshMode};
use crate::request::{decode_location, encode_location, IpResolver, RequestContext, SetCookie};
use crate::settings::{Setting, SettingsStore};

pub struct LocationResolver {
    settings: Arc<dyn SettingsStore>,
    database: Arc<DatabaseManager>,
    source: Arc<dyn LocationSource>,
    ip_resolver: IpResolver,
}

impl LocationResolver {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        database: Arc<DatabaseManager>,
        source: Arc<dyn LocationSource>,
    ) -> Self {
        Self {
            settings,
            database,
            source,
            ip_resolver: IpResolver::new(),
        }
    }

    pub fn with_ip_resolver(mut self, ip_resolver: IpResolver) -> Self {
        self.ip_resolver = ip_resolver;
        self
    }

    pub fn ip_resolver(&self) -> &IpResolver {
        &self.ip_resolver
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.database
    }

    /// Resolves the location of the visitor making the request.
    pub async fn lookup_request(&self, ctx: &mut RequestContext) -> LocationRecord {
        let ip = self.ip_resolver.resolve_request(ctx);
        self.lookup(ctx, &ip).await
    }

    /// Resolves the location of `ip`, caching it in the request's location
    /// cookie.
    ///
    /// Debug mode skips the cached value but still writes a fresh one when
    /// none is present. An undecodable cookie is replaced.
    pub async fn lookup(&self, ctx: &mut RequestContext, ip: &str) -> LocationRecord {
        if !self.settings.flag(Setting::GeolocationEnabled) || ip == LOOPBACK_SENTINEL {
            return LocationRecord::default();
        }

        if !self
            .database
            .ensure_available(&mut ctx.latch, RefreshMode::OnDemand)
            .await
        {
            log::debug!("Location database unavailable; treating {} as unknown", ip);
            return LocationRecord::default();
        }

        let debug_mode = self.settings.flag(Setting::LocationDebug);
        let cookie_name = ctx.delivery.cookie_name();
        let cached = ctx.cookie(cookie_name).map(decode_location);

        match &cached {
            Some(Some(record)) if !debug_mode => {
                log::debug!("Location of {} read from {} cookie", ip, cookie_name);
                return record.clone();
            }
            Some(None) => log::debug!("Replacing undecodable {} cookie", cookie_name),
            _ => {}
        }

        let record = match self.source.locate(self.database.path(), ip) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Error calculating location of {}: {}", ip, e);
                if ctx.roles.administrator || debug_mode {
                    ctx.debug(format!("Error Calculating Location: {}", e));
                }
                return LocationRecord::default();
            }
        };

        let cache_usable = matches!(cached, Some(Some(_)));
        if !cache_usable && !ctx.headers_sent {
            ctx.set_cookie(SetCookie::session(cookie_name, encode_location(&record)));
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::LookupError;
    use crate::geoip::DatabaseManagerConfig;
    use crate::request::{DeliveryMode, VisitorRoles};
    use crate::settings::{DownloadErrorEntry, JsonSettings};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Location source that counts queries and returns a fixed answer.
    struct CountingSource {
        calls: AtomicUsize,
        answer: Option<LocationRecord>,
    }

    impl CountingSource {
        fn answering(record: LocationRecord) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer: Some(record),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LocationSource for CountingSource {
        fn locate(&self, _path: &Path, ip: &str) -> Result<LocationRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| LookupError::InvalidAddress(ip.to_string()))
        }
    }

    fn denver() -> LocationRecord {
        LocationRecord {
            city: Some("Denver".to_string()),
            region: Some("Colorado".to_string()),
            country: Some("United States".to_string()),
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        settings: Arc<JsonSettings>,
        source: Arc<CountingSource>,
        resolver: LocationResolver,
    }

    fn fixture(source: CountingSource, database_present: bool) -> Fixture {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("GeoLite2-City.mmdb");
        if database_present {
            std::fs::write(&path, "database").expect("write");
        }
        let settings = Arc::new(JsonSettings::in_memory());
        settings.set_flag(Setting::GeolocationEnabled, true).unwrap();

        let database = Arc::new(DatabaseManager::with_clients(
            DatabaseManagerConfig {
                path,
                link_endpoint: "http://127.0.0.1:9/link".to_string(),
                download_source: "geo_consent".to_string(),
                site_domain: "example.com".to_string(),
            },
            settings.clone(),
            reqwest::Client::new(),
            reqwest::Client::new(),
        ));
        let source = Arc::new(source);
        let resolver = LocationResolver::new(settings.clone(), database, source.clone());
        Fixture {
            _temp_dir: temp_dir,
            settings,
            source,
            resolver,
        }
    }

    fn request() -> RequestContext {
        RequestContext::new(DeliveryMode::Synchronous).with_remote_addr("73.14.194.136")
    }

    #[tokio::test]
    async fn test_cookie_round_trip_avoids_second_query() {
        let f = fixture(CountingSource::answering(denver()), true);

        let mut first = request();
        assert_eq!(f.resolver.lookup_request(&mut first).await, denver());
        assert_eq!(f.source.calls(), 1);
        let cookies = first.response_cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "consent-geoip");

        // Browser sends the cookie back on the next page load
        let header = cookies[0].header_value();
        let pair = header.split(';').next().expect("name=value");
        let mut second = request().with_header("Cookie", pair);
        assert_eq!(f.resolver.lookup_request(&mut second).await, denver());
        assert_eq!(f.source.calls(), 1);
        assert!(second.response_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_cookie_set_once_per_request() {
        let f = fixture(CountingSource::answering(denver()), true);
        let mut ctx = request();
        f.resolver.lookup_request(&mut ctx).await;
        f.resolver.lookup_request(&mut ctx).await;
        assert_eq!(f.source.calls(), 1);
        assert_eq!(ctx.response_cookies().len(), 1);
    }

    #[tokio::test]
    async fn test_async_mode_uses_its_own_cookie() {
        let f = fixture(CountingSource::answering(denver()), true);
        let mut ctx = RequestContext::new(DeliveryMode::Asynchronous)
            .with_remote_addr("73.14.194.136")
            .with_cookie("consent-geoip", encode_location(&LocationRecord::default()));
        assert_eq!(f.resolver.lookup_request(&mut ctx).await, denver());
        assert_eq!(ctx.response_cookies()[0].name, "consent-geoip-ajax");
    }

    #[tokio::test]
    async fn test_debug_mode_bypasses_cookie_read() {
        let f = fixture(CountingSource::answering(denver()), true);
        f.settings.set_flag(Setting::LocationDebug, true).unwrap();

        let stale = LocationRecord {
            country: Some("France".to_string()),
            ..Default::default()
        };
        let mut ctx = request().with_cookie("consent-geoip", encode_location(&stale));
        assert_eq!(f.resolver.lookup_request(&mut ctx).await, denver());
        assert_eq!(f.source.calls(), 1);
        // Existing cookie is left alone
        assert!(ctx.response_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_cookie_is_replaced() {
        let f = fixture(CountingSource::answering(denver()), true);
        let mut ctx = request().with_cookie("consent-geoip", "garbage");
        assert_eq!(f.resolver.lookup_request(&mut ctx).await, denver());
        assert_eq!(f.source.calls(), 1);

        let cookies = ctx.response_cookies();
        assert_eq!(cookies.len(), 1);
        assert_eq!(decode_location(&cookies[0].value), Some(denver()));

        // The replacement serves the rest of the session
        let header = cookies[0].header_value();
        let pair = header.split(';').next().expect("name=value");
        let mut next = request().with_header("Cookie", pair);
        assert_eq!(f.resolver.lookup_request(&mut next).await, denver());
        assert_eq!(f.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_unknown_without_cookie() {
        let f = fixture(CountingSource::failing(), true);
        let mut ctx = request().with_roles(VisitorRoles::parse("administrator"));
        assert_eq!(
            f.resolver.lookup_request(&mut ctx).await,
            LocationRecord::default()
        );
        assert!(ctx.response_cookies().is_empty());
        assert_eq!(ctx.debug_messages().len(), 1);
        assert!(ctx.debug_messages()[0].starts_with("Error Calculating Location"));
    }

    #[tokio::test]
    async fn test_lookup_failure_hidden_from_visitors() {
        let f = fixture(CountingSource::failing(), true);
        let mut ctx = request();
        f.resolver.lookup_request(&mut ctx).await;
        assert!(ctx.debug_messages().is_empty());
    }

    #[tokio::test]
    async fn test_headers_sent_prevents_cookie() {
        let f = fixture(CountingSource::answering(denver()), true);
        let mut ctx = request();
        ctx.headers_sent = true;
        assert_eq!(f.resolver.lookup_request(&mut ctx).await, denver());
        assert!(ctx.response_cookies().is_empty());
    }

    #[tokio::test]
    async fn test_geolocation_disabled_is_unknown() {
        let f = fixture(CountingSource::answering(denver()), true);
        f.settings.set_flag(Setting::GeolocationEnabled, false).unwrap();
        let mut ctx = request();
        assert_eq!(
            f.resolver.lookup_request(&mut ctx).await,
            LocationRecord::default()
        );
        assert_eq!(f.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_loopback_is_unknown() {
        let f = fixture(CountingSource::answering(denver()), true);
        let mut ctx = RequestContext::new(DeliveryMode::Synchronous).with_remote_addr("::1");
        assert_eq!(
            f.resolver.lookup_request(&mut ctx).await,
            LocationRecord::default()
        );
        assert_eq!(f.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_database_ignores_cookie() {
        let f = fixture(CountingSource::answering(denver()), false);
        // Open the breaker so no download is attempted
        for _ in 0..6 {
            f.settings
                .record_download_error(DownloadErrorEntry::now("Download Error: HTTP 500"))
                .unwrap();
        }
        let mut ctx = request().with_cookie("consent-geoip", encode_location(&denver()));
        assert_eq!(
            f.resolver.lookup_request(&mut ctx).await,
            LocationRecord::default()
        );
        assert_eq!(f.source.calls(), 0);
        assert!(ctx.response_cookies().is_empty());
    }
}
