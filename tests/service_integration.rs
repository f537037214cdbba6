//! Integration tests for the decision service.
//!
//! The service runs on an ephemeral port and is driven over real sockets with
//! `reqwest`. Locations come from a fake source, so no database file needs to
//! be valid.

mod helpers;

use geo_consent::settings::{Setting, SettingsStore};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

use helpers::{spawn_service, test_engine};

const BRAZIL: &str = "200.147.67.142";
const FRANCE: &str = "194.177.63.255";

async fn json_body(response: reqwest::Response) -> Value {
    let text = response.text().await.expect("Should read body");
    serde_json::from_str(&text).expect("Body should be JSON")
}

fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_lookup_without_nonce_is_invalid() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, Some("n0nce")).await;

    let response = reqwest::get(format!("http://{}/geolocation-lookup", addr))
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid Request");
    assert_eq!(t.locations.calls(), 0);
}

#[tokio::test]
async fn test_lookup_with_wrong_nonce_is_unauthorized() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, Some("n0nce")).await;

    let response = reqwest::get(format!("http://{}/geolocation-lookup?nonce=guess", addr))
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_lookup_hides_outside_enabled_jurisdictions() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, Some("n0nce")).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/geolocation-lookup?nonce=n0nce", addr))
        .header("CF-Connecting-IP", BRAZIL)
        .send()
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("consent-geoip-ajax="));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["hide"], true);
    // Debug fields only appear in debug mode
    assert!(body["data"].get("ipAddress").is_none());
}

#[tokio::test]
async fn test_lookup_post_with_location_override_in_debug_mode() {
    let t = test_engine(None);
    t.settings
        .set_flag(Setting::LocationDebug, true)
        .expect("Failed to set flag");
    let addr = spawn_service(&t.engine, None).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/geolocation-lookup", addr))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("nonce=anything&location=france")
        .send()
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["hide"], false);
    assert_eq!(data["ipAddress"], FRANCE);
    assert_eq!(data["city"], "Paris");
    assert_eq!(data["country"], "France");
    assert_eq!(data["locations"]["eu"], true);
    assert_eq!(data["locations"]["california"], false);
}

#[tokio::test]
async fn test_lookup_debug_mode_fills_unknown_fields() {
    let t = test_engine(None);
    t.settings
        .set_flag(Setting::LocationDebug, true)
        .expect("Failed to set flag");
    let addr = spawn_service(&t.engine, None).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/geolocation-lookup?nonce=x", addr))
        .header("X-Forwarded-For", "198.51.100.7, 10.0.0.1")
        .send()
        .await
        .expect("Request should succeed");
    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["ipAddress"], "198.51.100.7");
    assert_eq!(data["city"], "Unknown");
    assert_eq!(data["state"], "Unknown");
    assert_eq!(data["country"], "Unknown");
    // Unknown visitors may be anywhere, including jurisdictions that are off
    assert_eq!(data["hide"], true);
    assert_eq!(data["locations"]["eu"], true);
    assert_eq!(data["locations"]["texas"], true);
}

#[tokio::test]
async fn test_render_decision_suppresses_by_location() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, None).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/render-decision", addr))
        .header("CF-Connecting-IP", BRAZIL)
        .send()
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)[0].starts_with("consent-geoip="));

    let body = json_body(response).await;
    assert_eq!(body["show"], false);
    assert_eq!(body["reason"], "location");
    assert_eq!(body["suppressInitialDisplay"], false);
}

#[tokio::test]
async fn test_render_decision_force_enable_and_roles() {
    let t = test_engine(None);
    t.settings
        .set_flag(Setting::DisableForEditor, true)
        .expect("Failed to set flag");
    let addr = spawn_service(&t.engine, None).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/render-decision", addr))
        .header("X-Consent-Roles", "editor")
        .header("CF-Connecting-IP", FRANCE)
        .send()
        .await
        .expect("Request should succeed");
    let body = json_body(response).await;
    assert_eq!(body["show"], false);
    assert_eq!(body["reason"], "editor");

    let response = client
        .get(format!("http://{}/render-decision?enable-consent", addr))
        .header("X-Consent-Roles", "editor")
        .header("CF-Connecting-IP", BRAZIL)
        .send()
        .await
        .expect("Request should succeed");
    let body = json_body(response).await;
    assert_eq!(body["show"], true);
    assert!(body.get("reason").is_none());
    // The location was never needed
    assert_eq!(t.locations.calls(), 0);
}

#[tokio::test]
async fn test_render_decision_async_mode_defers_location() {
    let t = test_engine(None);
    t.settings
        .set_flag(Setting::AsyncMode, true)
        .expect("Failed to set flag");
    let addr = spawn_service(&t.engine, None).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/render-decision", addr))
        .header("CF-Connecting-IP", BRAZIL)
        .send()
        .await
        .expect("Request should succeed");
    let body = json_body(response).await;
    assert_eq!(body["show"], true);
    assert_eq!(body["suppressInitialDisplay"], true);
    assert_eq!(t.locations.calls(), 0);
}

#[tokio::test]
async fn test_location_cookie_round_trip() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, None).await;
    let client = reqwest::Client::new();

    let first = client
        .get(format!("http://{}/render-decision", addr))
        .header("CF-Connecting-IP", FRANCE)
        .send()
        .await
        .expect("Request should succeed");
    let cookie = set_cookies(&first)
        .into_iter()
        .next()
        .expect("Location cookie should be set");
    let pair = cookie.split(';').next().expect("name=value").to_string();
    assert_eq!(t.locations.calls(), 1);

    // A Brazilian address with a French cookie: the cookie wins
    let second = client
        .get(format!("http://{}/render-decision", addr))
        .header("CF-Connecting-IP", BRAZIL)
        .header(COOKIE, pair)
        .send()
        .await
        .expect("Request should succeed");
    assert!(set_cookies(&second).is_empty());
    let body = json_body(second).await;
    assert_eq!(body["show"], true);
    assert_eq!(t.locations.calls(), 1);
}

#[tokio::test]
async fn test_diagnostics_reports_database_and_location() {
    let t = test_engine(None);
    let addr = spawn_service(&t.engine, None).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/diagnostics?consent-debug=england", addr))
        .send()
        .await
        .expect("Request should succeed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["database"]["exists"], true);
    assert_eq!(body["database"]["download_error_count"], 0);
    assert_eq!(body["geolocationEnabled"], true);
    assert_eq!(body["asyncMode"], false);
    assert_eq!(body["location"], "London, England United Kingdom");
}
