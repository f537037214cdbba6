//! Request-level gate evaluation.

use std::sync::Arc;

use crate::config::{
    FORCE_ENABLE_PARAM, LOCATION_DEBUG_PARAM, LOCATION_OVERRIDE_PARAM, UNKNOWN_LOCATION,
};
use crate::error_handling::ClassificationError;
use crate::geoip::LocationRecord;
use crate::jurisdiction::{classify_all, JurisdictionRegistry};
use crate::location::LocationResolver;
use crate::request::RequestContext;
use crate::settings::{JurisdictionToggleSet, SettingsStore};

use super::hide::should_hide_consent_tool;
use super::policy::{GatePolicy, RenderDecision, SuppressReason};
use super::response::LookupData;

/// Decides, per request, whether the consent script is emitted.
pub struct ConsentGate {
    registry: Arc<JurisdictionRegistry>,
    settings: Arc<dyn SettingsStore>,
    locations: LocationResolver,
}

impl ConsentGate {
    pub fn new(
        registry: Arc<JurisdictionRegistry>,
        settings: Arc<dyn SettingsStore>,
        locations: LocationResolver,
    ) -> Self {
        Self {
            registry,
            settings,
            locations,
        }
    }

    pub fn registry(&self) -> &JurisdictionRegistry {
        &self.registry
    }

    pub fn locations(&self) -> &LocationResolver {
        &self.locations
    }

    pub fn policy(&self) -> GatePolicy {
        GatePolicy::load(self.settings.as_ref())
    }

    /// Whether the visitor's location hides the consent tool.
    pub async fn should_hide_for_request(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<bool, ClassificationError> {
        let location = self.locations.lookup_request(ctx).await;
        self.should_hide_at(&location)
    }

    /// Whether a resolved location hides the consent tool.
    pub fn should_hide_at(&self, location: &LocationRecord) -> Result<bool, ClassificationError> {
        let toggles = JurisdictionToggleSet::load(self.settings.as_ref(), &self.registry);
        should_hide_consent_tool(&self.registry, &toggles, location)
    }

    /// Render-time decision. The first matching rule wins:
    /// force-enable, troubleshooting, role overrides, then location (only in
    /// synchronous mode). The location is resolved only when that last rule
    /// needs it.
    pub async fn render_decision(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<RenderDecision, ClassificationError> {
        let policy = self.policy();
        let show = RenderDecision::Show {
            suppress_initial_display: policy.async_mode(),
        };

        if ctx.query_param(FORCE_ENABLE_PARAM).is_some() {
            log::debug!("Consent tool force-enabled by query parameter");
            return Ok(show);
        }

        if policy.disable_for_troubleshooting {
            return Ok(RenderDecision::Suppress(SuppressReason::Troubleshooting));
        }

        if let Some(reason) = policy.role_suppression(&ctx.roles) {
            return Ok(RenderDecision::Suppress(reason));
        }

        if policy.geolocation_enabled
            && !policy.async_mode()
            && self.should_hide_for_request(ctx).await?
        {
            return Ok(RenderDecision::Suppress(SuppressReason::Location));
        }

        Ok(show)
    }

    /// Body of the asynchronous (client-initiated) lookup.
    ///
    /// A `location` override names a debug location, exactly like the
    /// debug query parameter. Debug mode adds the resolved address, the
    /// location and per-jurisdiction membership.
    pub async fn lookup_data(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<LookupData, ClassificationError> {
        if let Some(location) = ctx.query_param(LOCATION_OVERRIDE_PARAM).map(str::to_string) {
            ctx.set_query_param(LOCATION_DEBUG_PARAM, location);
        }

        let ip = self.locations.ip_resolver().resolve_request(ctx);
        let location = self.locations.lookup(ctx, &ip).await;
        let mut data = LookupData {
            hide: self.should_hide_at(&location)?,
            ..Default::default()
        };

        if self.policy().location_debug {
            let or_unknown =
                |field: Option<String>| Some(field.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()));
            data.ip_address = Some(ip);
            data.locations = Some(classify_all(&self.registry, &location));
            data.city = or_unknown(location.city);
            data.state = or_unknown(location.region);
            data.country = or_unknown(location.country);
        }
        Ok(data)
    }

    /// Human readable location of the visitor, `"Unknown"` if unresolved.
    pub async fn location_display_name(&self, ctx: &mut RequestContext) -> String {
        self.locations.lookup_request(ctx).await.display_name()
    }
}
