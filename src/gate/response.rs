//! JSON bodies returned to the host and the browser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::jurisdiction::JurisdictionKey;

use super::policy::{RenderDecision, SuppressReason};

/// Envelope of the asynchronous lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LookupData>,
}

impl LookupResponse {
    pub fn ok(data: LookupData) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Asynchronous lookup result. Everything but `hide` is debug output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupData {
    pub hide: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Membership per jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<BTreeMap<JurisdictionKey, bool>>,
}

/// Render-time decision returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDecisionBody {
    pub show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SuppressReason>,
    pub suppress_initial_display: bool,
    pub hide_privacy_settings_link: bool,
    /// Administrator diagnostics collected while deciding
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<String>,
}

impl RenderDecisionBody {
    pub fn new(decision: RenderDecision, hide_privacy_settings_link: bool, debug: Vec<String>) -> Self {
        let suppress_initial_display = match decision {
            RenderDecision::Show {
                suppress_initial_display,
            } => suppress_initial_display,
            RenderDecision::Suppress(_) => false,
        };
        Self {
            show: decision.is_shown(),
            reason: decision.reason(),
            suppress_initial_display,
            hide_privacy_settings_link,
            debug,
        }
    }
}
