//! Client address resolution behind proxies and CDNs.
//!
//! No format validation happens here; a malformed address simply fails the
//! database lookup later. Forwarding headers are client-controlled unless a
//! trusted proxy strips them, so the result must not be used for anything
//! stronger than consent gating.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{
    CLIENT_IP_HEADERS, DEBUG_LOCATION_IPS, LOCATION_DEBUG_PARAM, PLACEHOLDER_REMOTE_ADDR,
    STRIPPED_IP_ARTIFACTS,
};

use super::context::RequestContext;

/// Host-supplied hook that receives the resolved address and may replace it.
pub type IpOverrideHook = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Reference address for a named debug location (case insensitive).
pub fn debug_location_ip(name: &str) -> Option<&'static str> {
    let name = name.trim().to_ascii_lowercase();
    DEBUG_LOCATION_IPS
        .iter()
        .find(|(location, _)| *location == name)
        .map(|(_, ip)| *ip)
}

/// Extracts the visitor address from the connection and forwarding headers.
#[derive(Clone)]
pub struct IpResolver {
    header_order: Vec<String>,
    hook: Option<IpOverrideHook>,
}

impl fmt::Debug for IpResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpResolver")
            .field("header_order", &self.header_order)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Default for IpResolver {
    fn default() -> Self {
        Self {
            header_order: CLIENT_IP_HEADERS.iter().map(|h| h.to_string()).collect(),
            hook: None,
        }
    }
}

impl IpResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the header scan order. Later headers take precedence.
    pub fn with_header_order<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.header_order = headers
            .into_iter()
            .map(|h| h.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_hook(mut self, hook: IpOverrideHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Resolves the visitor address.
    ///
    /// `headers` must be keyed by lowercase name. Every present header in the
    /// scan order overwrites the candidate, so the last present one wins.
    /// Never fails.
    pub fn resolve(&self, headers: &HashMap<String, String>, remote_addr: Option<&str>) -> String {
        let mut ip = remote_addr.unwrap_or(PLACEHOLDER_REMOTE_ADDR).to_string();
        for header in &self.header_order {
            if let Some(value) = headers.get(header) {
                ip = value.trim().to_string();
            }
        }

        for artifact in STRIPPED_IP_ARTIFACTS {
            ip = ip.replace(artifact, "");
        }
        if let Some((first, _)) = ip.split_once(',') {
            ip = first.to_string();
        }

        match &self.hook {
            Some(hook) => hook(ip),
            None => ip,
        }
    }

    /// Resolves the address of a request, applying the named-location debug
    /// override when present.
    pub fn resolve_request(&self, ctx: &RequestContext) -> String {
        let ip = self.resolve(ctx.headers(), ctx.remote_addr());
        match ctx
            .query_param(LOCATION_DEBUG_PARAM)
            .and_then(debug_location_ip)
        {
            Some(debug_ip) => {
                log::debug!("Debug location override: {} replaced by {}", ip, debug_ip);
                debug_ip.to_string()
            }
            None => ip,
        }
    }
}
