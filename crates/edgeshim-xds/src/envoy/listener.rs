//! `envoy.config.listener.v3`: listeners, filter chains, network filters

/// Listener type URL used for LDS resources
pub const LISTENER_TYPE_URL: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";

/// [#next-free-field: 36]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Listener {
    /// The unique name by which this listener is known.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// The address that the listener should listen on.
    #[prost(message, optional, tag = "2")]
    pub address: ::core::option::Option<super::base::Address>,
    /// A list of filter chains to consider for this listener.
    #[prost(message, repeated, tag = "3")]
    pub filter_chains: ::prost::alloc::vec::Vec<FilterChain>,
}
/// A filter chain wraps a set of match criteria, an option TLS context, a set of filters, and
/// various other parameters.
/// [#next-free-field: 10]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterChain {
    /// A list of individual network filters that make up the filter chain.
    #[prost(message, repeated, tag = "3")]
    pub filters: ::prost::alloc::vec::Vec<Filter>,
    /// Optional custom transport socket implementation to use for downstream connections.
    /// TLS termination is configured here.
    #[prost(message, optional, tag = "6")]
    pub transport_socket: ::core::option::Option<super::base::TransportSocket>,
    /// The unique name (or empty) by which this filter chain is known.
    #[prost(string, tag = "7")]
    pub name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Filter {
    /// The name of the filter configuration.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "filter::ConfigType", tags = "4")]
    pub config_type: ::core::option::Option<filter::ConfigType>,
}
/// Nested message and enum types in `Filter`.
pub mod filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        /// Filter specific configuration which depends on the filter being
        /// instantiated.
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

impl Listener {
    pub fn port(&self) -> Option<u32> {
        self.address.as_ref()?.socket_address()?.port_value()
    }
}

impl Filter {
    pub fn typed_config(&self) -> Option<&::prost_types::Any> {
        match self.config_type.as_ref()? {
            filter::ConfigType::TypedConfig(any) => Some(any),
        }
    }
}
