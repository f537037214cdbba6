//! Server data structures.

use std::sync::Arc;

use serde::Serialize;

use crate::gate::ConsentGate;
use crate::geoip::GeoDatabaseState;

use super::nonce::NonceVerifier;

/// Shared state of the decision service
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<ConsentGate>,
    pub nonce: Arc<dyn NonceVerifier>,
}

/// JSON response for `/diagnostics`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub database: GeoDatabaseState,
    pub geolocation_enabled: bool,
    pub async_mode: bool,
    pub location_debug: bool,
    /// Display name of the requesting visitor's location
    pub location: String,
}

/// JSON body for internal failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}
