//! Per-request inputs and outputs.
//!
//! A [`RequestContext`] carries everything the engine reads from one visitor
//! request (headers, query, cookies, roles) and everything it produces for
//! the response (cookies to set, administrator debug messages), plus the
//! per-request download error latch.

mod context;
mod cookie;
mod ip;

// Re-export public API
pub use context::{DeliveryMode, ErrorLatch, RequestContext, VisitorRoles};
pub use cookie::{decode_location, encode_location, parse_cookie_header, SetCookie};
pub use ip::{debug_location_ip, IpOverrideHook, IpResolver};
