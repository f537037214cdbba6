//! Render-time gating policy.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::request::{DeliveryMode, VisitorRoles};
use crate::settings::{Setting, SettingsStore};

/// Gate-related settings, read once per decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatePolicy {
    pub geolocation_enabled: bool,
    /// Stored async flag; only effective with geolocation enabled
    pub async_flag: bool,
    pub location_debug: bool,
    pub disable_for_troubleshooting: bool,
    pub disable_for_logged_in: bool,
    pub disable_for_editor: bool,
    pub disable_for_administrator: bool,
    pub hide_privacy_settings_link: bool,
}

impl GatePolicy {
    pub fn load(settings: &dyn SettingsStore) -> Self {
        Self {
            geolocation_enabled: settings.flag(Setting::GeolocationEnabled),
            async_flag: settings.flag(Setting::AsyncMode),
            location_debug: settings.flag(Setting::LocationDebug),
            disable_for_troubleshooting: settings.flag(Setting::DisableForTroubleshooting),
            disable_for_logged_in: settings.flag(Setting::DisableForLoggedIn),
            disable_for_editor: settings.flag(Setting::DisableForEditor),
            disable_for_administrator: settings.flag(Setting::DisableForAdministrator),
            hide_privacy_settings_link: settings.flag(Setting::HidePrivacySettingsLink),
        }
    }

    /// Whether location gating happens client-side after page load.
    pub fn async_mode(&self) -> bool {
        self.geolocation_enabled && self.async_flag
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        if self.async_mode() {
            DeliveryMode::Asynchronous
        } else {
            DeliveryMode::Synchronous
        }
    }

    /// The first role override that suppresses the tool for these roles.
    pub fn role_suppression(&self, roles: &VisitorRoles) -> Option<SuppressReason> {
        if self.disable_for_logged_in && roles.logged_in {
            Some(SuppressReason::LoggedIn)
        } else if self.disable_for_editor && roles.editor {
            Some(SuppressReason::Editor)
        } else if self.disable_for_administrator && roles.administrator {
            Some(SuppressReason::Administrator)
        } else {
            None
        }
    }
}

/// Why the consent script is not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SuppressReason {
    Troubleshooting,
    LoggedIn,
    Editor,
    Administrator,
    Location,
}

/// Outcome of the render-time gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Emit the consent script.
    Show {
        /// Keep the banner hidden until the client-side lookup reveals it
        suppress_initial_display: bool,
    },
    Suppress(SuppressReason),
}

impl RenderDecision {
    pub fn is_shown(&self) -> bool {
        matches!(self, RenderDecision::Show { .. })
    }

    pub fn reason(&self) -> Option<SuppressReason> {
        match self {
            RenderDecision::Show { .. } => None,
            RenderDecision::Suppress(reason) => Some(*reason),
        }
    }
}
