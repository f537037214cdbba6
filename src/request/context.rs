//! Request context.

use std::collections::HashMap;

use crate::config::{ASYNC_LOCATION_COOKIE, SYNC_LOCATION_COOKIE};

use super::cookie::{parse_cookie_header, SetCookie};

/// How the location-dependent decision reaches the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Decided while the page is rendered
    Synchronous,
    /// Decided by a client-initiated lookup after the page loads
    Asynchronous,
}

impl DeliveryMode {
    /// Name of the location cookie used by this mode.
    pub fn cookie_name(&self) -> &'static str {
        match self {
            DeliveryMode::Synchronous => SYNC_LOCATION_COOKIE,
            DeliveryMode::Asynchronous => ASYNC_LOCATION_COOKIE,
        }
    }
}

/// Roles of the current visitor, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorRoles {
    pub logged_in: bool,
    pub editor: bool,
    pub administrator: bool,
}

impl VisitorRoles {
    /// Parses a comma separated role list (`logged-in`, `editor`,
    /// `administrator`). Unknown roles are ignored.
    ///
    /// Editors and administrators are always logged in.
    pub fn parse(raw: &str) -> Self {
        let mut roles = Self::default();
        for role in raw.split(',').map(|r| r.trim().to_ascii_lowercase()) {
            match role.as_str() {
                "logged-in" | "logged_in" => roles.logged_in = true,
                "editor" => roles.editor = true,
                "administrator" | "admin" => roles.administrator = true,
                "" => {}
                other => log::debug!("Ignoring unknown visitor role {:?}", other),
            }
        }
        roles.logged_in |= roles.editor || roles.administrator;
        roles
    }
}

/// Remembers whether a download error was already recorded in the current
/// execution context (one request, or one scheduled run).
///
/// Once set, further download errors are not recorded and further downloads
/// are not attempted until a fresh context begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorLatch {
    set: bool,
}

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub(crate) fn set(&mut self) {
        self.set = true;
    }
}

/// Everything the engine reads from, and writes for, one visitor request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request headers, names lowercased
    headers: HashMap<String, String>,
    remote_addr: Option<String>,
    query: HashMap<String, String>,
    /// Request cookies, plus cookies set earlier in this request
    cookies: HashMap<String, String>,
    pub roles: VisitorRoles,
    pub delivery: DeliveryMode,
    /// Once true, no further cookies can be added to the response
    pub headers_sent: bool,
    pub latch: ErrorLatch,
    set_cookies: Vec<SetCookie>,
    debug_messages: Vec<String>,
}

impl RequestContext {
    pub fn new(delivery: DeliveryMode) -> Self {
        Self {
            headers: HashMap::new(),
            remote_addr: None,
            query: HashMap::new(),
            cookies: HashMap::new(),
            roles: VisitorRoles::default(),
            delivery,
            headers_sent: false,
            latch: ErrorLatch::new(),
            set_cookies: Vec::new(),
            debug_messages: Vec::new(),
        }
    }

    /// Adds a request header. A `Cookie` header is also parsed into cookies.
    ///
    /// Repeated lines of one header are joined with `", "`, so a forwarding
    /// chain split over several lines keeps its first hop first.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "cookie" {
            self.cookies.extend(parse_cookie_header(&value));
        }
        self.headers
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_roles(mut self, roles: VisitorRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Sets a query parameter after construction (request overrides).
    pub fn set_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.insert(name.into(), value.into());
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Queues a response cookie and makes it visible to later reads in this
    /// request.
    pub fn set_cookie(&mut self, cookie: SetCookie) {
        self.cookies.insert(cookie.name.clone(), cookie.value.clone());
        self.set_cookies.push(cookie);
    }

    /// Cookies queued for the response.
    pub fn response_cookies(&self) -> &[SetCookie] {
        &self.set_cookies
    }

    /// Records a diagnostic for the administrator debug channel.
    pub fn debug(&mut self, message: impl Into<String>) {
        self.debug_messages.push(message.into());
    }

    pub fn debug_messages(&self) -> &[String] {
        &self.debug_messages
    }
}
