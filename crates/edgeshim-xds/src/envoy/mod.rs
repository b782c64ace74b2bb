//! Envoy v3 resource model
//!
//! prost messages for the subset of the Envoy v3 API the composer writes.
//! Field tags follow envoyproxy/data-plane-api, so encoded resources decode
//! in Envoy and in any full generated binding. Fields the composer never
//! touches are omitted; prost skips them when decoding foreign bytes.

pub mod auth;
pub mod base;
pub mod hcm;
pub mod listener;
pub mod matcher;
pub mod route;
pub mod tls;

/// Well-known filter and transport socket names
pub mod names {
    /// Network filter name of the HTTP connection manager
    pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";
    /// HTTP filter name of the router
    pub const ROUTER: &str = "envoy.filters.http.router";
    /// HTTP filter name of JWT authentication
    pub const JWT_AUTHN: &str = "envoy.filters.http.jwt_authn";
    /// HTTP filter name of external authorization
    pub const EXT_AUTHZ: &str = "envoy.filters.http.ext_authz";
    /// Transport socket name of TLS
    pub const TLS_TRANSPORT_SOCKET: &str = "envoy.transport_sockets.tls";
}
