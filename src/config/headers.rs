//! HTTP header name constants.
//!
//! This module defines the proxy/CDN headers consulted when resolving the
//! visitor's address, plus the header the host uses to pass visitor roles.

/// Standard multi-hop forwarding chain (also used by Ezoic)
pub const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
/// Generic real-IP header (Reblaze, nginx)
pub const HEADER_X_REAL_IP: &str = "x-real-ip";
/// Sucuri WAF client address
pub const HEADER_X_SUCURI_CLIENTIP: &str = "x-sucuri-clientip";
/// Akamai edge "true client IP"
pub const HEADER_TRUE_CLIENT_IP: &str = "true-client-ip";
/// Cloudflare connecting address
pub const HEADER_CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Client IP headers in scan order.
///
/// Every present header overwrites the candidate found so far, so the last
/// present header wins. Single-address edge headers come after the
/// multi-hop chain.
pub const CLIENT_IP_HEADERS: &[&str] = &[
    HEADER_X_FORWARDED_FOR,
    HEADER_X_REAL_IP,
    HEADER_X_SUCURI_CLIENTIP,
    HEADER_TRUE_CLIENT_IP,
    HEADER_CF_CONNECTING_IP,
];

/// Roles of the current visitor, set by the host (comma separated)
pub const HEADER_CONSENT_ROLES: &str = "x-consent-roles";
