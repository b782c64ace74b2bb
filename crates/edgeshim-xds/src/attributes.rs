//! Attribute resolution
//!
//! Derives the canonical resource names, port and TLS flag for an intent.
//! Pure and total: no I/O, no failure modes.

use crate::envoy::route::{HeaderMatcher, RouteMatch};
use edgeshim_common::{ComposerConfig, Conditions, ListenerIntent, TlsParams};

/// Header Envoy exposes the request method on
pub const METHOD_HEADER: &str = ":method";

/// How a forwarding route matches the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    Prefix(String),
    Path(String),
    SafeRegex(String),
}

impl PathMatch {
    /// Resolve the path match of a set of conditions.
    ///
    /// Regex wins over path, path wins over prefix; an empty or `/` prefix
    /// becomes the catch-all `/`.
    pub fn from_conditions(conditions: &Conditions) -> Self {
        if !conditions.regex.is_empty() {
            Self::SafeRegex(conditions.regex.clone())
        } else if !conditions.path.is_empty() {
            Self::Path(conditions.path.clone())
        } else {
            Self::Prefix(target_prefix(conditions))
        }
    }

    pub fn to_route_match(&self) -> RouteMatch {
        match self {
            Self::Prefix(prefix) => RouteMatch::prefix(prefix.as_str()),
            Self::Path(path) => RouteMatch::path(path.as_str()),
            Self::SafeRegex(regex) => RouteMatch::safe_regex(regex.as_str()),
        }
    }
}

/// Canonical attributes of an intent
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerAttributes {
    pub tls: bool,
    pub target_prefix: String,
    pub path_match: PathMatch,
    pub headers: Vec<HeaderMatcher>,
    pub virtual_host_name: String,
    pub route_config_name: String,
    pub listener_name: String,
    pub listener_port: u32,
}

impl ListenerAttributes {
    pub fn resolve(
        intent: &ListenerIntent,
        tls_params: Option<&TlsParams>,
        config: &ComposerConfig,
    ) -> Self {
        let tls = tls_params.is_some_and(TlsParams::is_enabled);
        let hostname = &intent.conditions.hostname;

        let host_suffix = if hostname.is_empty() {
            "wildcard"
        } else {
            hostname.as_str()
        };
        let mut virtual_host_name = format!("{}_service_{}", intent.name, host_suffix);
        let mut route_config_name = format!("{}_route_{}", intent.name, host_suffix);
        if tls {
            virtual_host_name.push_str("_tls");
            route_config_name.push_str("_tls");
        }

        Self {
            tls,
            target_prefix: target_prefix(&intent.conditions),
            path_match: PathMatch::from_conditions(&intent.conditions),
            headers: method_matcher(&intent.conditions.methods).into_iter().collect(),
            virtual_host_name,
            route_config_name,
            listener_name: listener_name(intent.listener_group(), tls),
            listener_port: config.port_for(tls),
        }
    }

    /// Route match of the forwarding route, headers included
    pub fn route_match(&self) -> RouteMatch {
        let mut route_match = self.path_match.to_route_match();
        route_match.headers = self.headers.clone();
        route_match
    }
}

/// `l_{name}` or `l_{name}_tls`
pub fn listener_name(name: &str, tls: bool) -> String {
    if tls {
        format!("l_{}_tls", name)
    } else {
        format!("l_{}", name)
    }
}

/// Path prefix of the forwarding route
pub fn target_prefix(conditions: &Conditions) -> String {
    match conditions.prefix.as_str() {
        "" | "/" => "/".to_string(),
        prefix => prefix.to_string(),
    }
}

/// Domain list entry of a virtual host
pub fn virtual_host_domain(conditions: &Conditions) -> String {
    if conditions.hostname.is_empty() {
        "*".to_string()
    } else {
        conditions.hostname.clone()
    }
}

/// Whether a virtual host belongs to the service `name` (`{name}_service`,
/// `{name}_service_wildcard`, `{name}_service_{hostname}`, each optionally
/// suffixed `_tls`). Hostnames carry no underscore, so the virtual hosts of a
/// service named `{name}_service` never match.
pub fn is_service_virtual_host(virtual_host_name: &str, name: &str) -> bool {
    let base = format!("{}_service", name);
    let Some(rest) = virtual_host_name.strip_prefix(base.as_str()) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let Some(host) = rest.strip_prefix('_') else {
        return false;
    };
    let host = host.strip_suffix("_tls").unwrap_or(host);
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '*' | ':'))
}

/// Single `:method` matcher accepting any of `methods`
fn method_matcher(methods: &[String]) -> Option<HeaderMatcher> {
    let mut methods: Vec<String> = methods
        .iter()
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect();
    if methods.is_empty() {
        return None;
    }
    methods.sort();
    methods.dedup();
    Some(HeaderMatcher::safe_regex(
        METHOD_HEADER,
        format!("^({})$", methods.join("|")),
    ))
}
