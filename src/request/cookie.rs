//! Location cookie encoding.
//!
//! The cookie value is the JSON location record, URL-encoded on the wire.

use url::form_urlencoded;

use crate::config::LOCATION_COOKIE_PATH;
use crate::geoip::LocationRecord;

/// A session cookie to send with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    /// Decoded value
    pub value: String,
    pub path: String,
}

impl SetCookie {
    /// Session cookie (no expiry) on the site root.
    pub fn session(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: LOCATION_COOKIE_PATH.to_string(),
        }
    }

    /// `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.value.as_bytes()).collect();
        format!("{}={}; Path={}", self.name, encoded, self.path)
    }
}

/// Serializes a location for the cookie.
pub fn encode_location(record: &LocationRecord) -> String {
    // Serializing a struct of optional strings cannot fail
    serde_json::to_string(record).unwrap_or_default()
}

/// Parses a cookie value; `None` if it is not a location record.
pub fn decode_location(value: &str) -> Option<LocationRecord> {
    serde_json::from_str(value).ok()
}

/// Splits a `Cookie` request header into decoded name/value pairs.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), decode_component(value.trim())))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    form_urlencoded::parse(format!("v={}", raw).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
