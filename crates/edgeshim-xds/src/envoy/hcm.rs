//! `envoy.extensions.filters.network.http_connection_manager.v3` and the
//! router HTTP filter

use super::route::RouteConfiguration;

/// [#next-free-field: 59]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpConnectionManager {
    /// Supplies the type of codec that the connection manager should use.
    #[prost(enumeration = "http_connection_manager::CodecType", tag = "1")]
    pub codec_type: i32,
    /// The human readable prefix to use when emitting statistics for the
    /// connection manager.
    #[prost(string, tag = "2")]
    pub stat_prefix: ::prost::alloc::string::String,
    /// A list of individual HTTP filters that make up the filter chain for
    /// requests made to the connection manager. The last filter must be the router.
    #[prost(message, repeated, tag = "5")]
    pub http_filters: ::prost::alloc::vec::Vec<HttpFilter>,
    #[prost(oneof = "http_connection_manager::RouteSpecifier", tags = "3, 4")]
    pub route_specifier: ::core::option::Option<http_connection_manager::RouteSpecifier>,
}
/// Nested message and enum types in `HttpConnectionManager`.
pub mod http_connection_manager {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum CodecType {
        /// For every new connection, the connection manager will determine which
        /// codec to use.
        Auto = 0,
        Http1 = 1,
        Http2 = 2,
        Http3 = 3,
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RouteSpecifier {
        /// The connection manager's route table will be dynamically loaded via the RDS API.
        #[prost(message, tag = "3")]
        Rds(super::Rds),
        /// The route table for the connection manager is static and is specified in this property.
        #[prost(message, tag = "4")]
        RouteConfig(super::super::route::RouteConfiguration),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rds {
    /// The name of the route configuration.
    #[prost(string, tag = "2")]
    pub route_config_name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpFilter {
    /// The name of the filter configuration.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "http_filter::ConfigType", tags = "4")]
    pub config_type: ::core::option::Option<http_filter::ConfigType>,
}
/// Nested message and enum types in `HttpFilter`.
pub mod http_filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}
/// `envoy.extensions.filters.http.router.v3.Router`, left at its defaults.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Router {}

impl HttpFilter {
    pub fn typed(name: impl Into<String>, config: ::prost_types::Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(http_filter::ConfigType::TypedConfig(config)),
        }
    }

    pub fn typed_config(&self) -> Option<&::prost_types::Any> {
        match self.config_type.as_ref()? {
            http_filter::ConfigType::TypedConfig(any) => Some(any),
        }
    }
}

impl HttpConnectionManager {
    /// HTTP filter named `name`
    pub fn http_filter(&self, name: &str) -> Option<&HttpFilter> {
        self.http_filters.iter().find(|f| f.name == name)
    }

    /// Inline route configuration, if the manager carries one
    pub fn route_config(&self) -> Option<&RouteConfiguration> {
        match self.route_specifier.as_ref()? {
            http_connection_manager::RouteSpecifier::RouteConfig(config) => Some(config),
            http_connection_manager::RouteSpecifier::Rds(_) => None,
        }
    }

    pub fn route_config_mut(&mut self) -> Option<&mut RouteConfiguration> {
        match self.route_specifier.as_mut()? {
            http_connection_manager::RouteSpecifier::RouteConfig(config) => Some(config),
            http_connection_manager::RouteSpecifier::Rds(_) => None,
        }
    }
}
