//! `envoy.config.core.v3`: addresses, data sources, transport sockets,
//! upstream service references

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Address {
    #[prost(oneof = "address::Address", tags = "1")]
    pub address: ::core::option::Option<address::Address>,
}
/// Nested message and enum types in `Address`.
pub mod address {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Address {
        #[prost(message, tag = "1")]
        SocketAddress(super::SocketAddress),
    }
}
/// [#next-free-field: 7]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SocketAddress {
    #[prost(enumeration = "socket_address::Protocol", tag = "1")]
    pub protocol: i32,
    /// Specify ``0.0.0.0`` or ``::`` to bind to any address.
    #[prost(string, tag = "2")]
    pub address: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub resolver_name: ::prost::alloc::string::String,
    #[prost(bool, tag = "6")]
    pub ipv4_compat: bool,
    #[prost(oneof = "socket_address::PortSpecifier", tags = "3, 4")]
    pub port_specifier: ::core::option::Option<socket_address::PortSpecifier>,
}
/// Nested message and enum types in `SocketAddress`.
pub mod socket_address {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Protocol {
        Tcp = 0,
        Udp = 1,
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PortSpecifier {
        #[prost(uint32, tag = "3")]
        PortValue(u32),
        #[prost(string, tag = "4")]
        NamedPort(::prost::alloc::string::String),
    }
}
/// Data source consisting of a file, an inline value, or an environment variable.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataSource {
    #[prost(oneof = "data_source::Specifier", tags = "1, 2, 3, 4")]
    pub specifier: ::core::option::Option<data_source::Specifier>,
}
/// Nested message and enum types in `DataSource`.
pub mod data_source {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Specifier {
        /// Local filesystem data source.
        #[prost(string, tag = "1")]
        Filename(::prost::alloc::string::String),
        /// Bytes inlined in the configuration.
        #[prost(bytes, tag = "2")]
        InlineBytes(::prost::alloc::vec::Vec<u8>),
        /// String inlined in the configuration.
        #[prost(string, tag = "3")]
        InlineString(::prost::alloc::string::String),
        /// Environment variable data source.
        #[prost(string, tag = "4")]
        EnvironmentVariable(::prost::alloc::string::String),
    }
}
/// Configuration for transport socket in listeners and clusters.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransportSocket {
    /// The name of the transport socket to instantiate.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "transport_socket::ConfigType", tags = "3")]
    pub config_type: ::core::option::Option<transport_socket::ConfigType>,
}
/// Nested message and enum types in `TransportSocket`.
pub mod transport_socket {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "3")]
        TypedConfig(::prost_types::Any),
    }
}
/// Envoy external URI descriptor
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpUri {
    /// The HTTP server URI.
    #[prost(string, tag = "1")]
    pub uri: ::prost::alloc::string::String,
    /// Sets the maximum duration in milliseconds that a response can take to arrive upon request.
    #[prost(message, optional, tag = "3")]
    pub timeout: ::core::option::Option<::prost_types::Duration>,
    #[prost(oneof = "http_uri::HttpUpstreamType", tags = "2")]
    pub http_upstream_type: ::core::option::Option<http_uri::HttpUpstreamType>,
}
/// Nested message and enum types in `HttpUri`.
pub mod http_uri {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HttpUpstreamType {
        /// A cluster is created in the Envoy "cluster_manager" config section.
        #[prost(string, tag = "2")]
        Cluster(::prost::alloc::string::String),
    }
}
/// gRPC service configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GrpcService {
    /// The timeout for the gRPC request.
    #[prost(message, optional, tag = "3")]
    pub timeout: ::core::option::Option<::prost_types::Duration>,
    #[prost(oneof = "grpc_service::TargetSpecifier", tags = "1")]
    pub target_specifier: ::core::option::Option<grpc_service::TargetSpecifier>,
}
/// Nested message and enum types in `GrpcService`.
pub mod grpc_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EnvoyGrpc {
        /// The name of the upstream gRPC cluster.
        #[prost(string, tag = "1")]
        pub cluster_name: ::prost::alloc::string::String,
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum TargetSpecifier {
        /// Envoy's in-built gRPC client.
        #[prost(message, tag = "1")]
        EnvoyGrpc(EnvoyGrpc),
    }
}
/// xDS API and non-xDS services version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ApiVersion {
    Auto = 0,
    V2 = 1,
    V3 = 2,
}

impl Address {
    /// TCP socket address with a numeric port
    pub fn tcp(ip: impl Into<String>, port: u32) -> Self {
        Self {
            address: Some(address::Address::SocketAddress(SocketAddress {
                protocol: socket_address::Protocol::Tcp as i32,
                address: ip.into(),
                port_specifier: Some(socket_address::PortSpecifier::PortValue(port)),
                ..Default::default()
            })),
        }
    }

    pub fn socket_address(&self) -> Option<&SocketAddress> {
        match self.address.as_ref()? {
            address::Address::SocketAddress(sa) => Some(sa),
        }
    }
}

impl SocketAddress {
    pub fn port_value(&self) -> Option<u32> {
        match self.port_specifier.as_ref()? {
            socket_address::PortSpecifier::PortValue(port) => Some(*port),
            socket_address::PortSpecifier::NamedPort(_) => None,
        }
    }
}

impl DataSource {
    pub fn inline_string(value: impl Into<String>) -> Self {
        Self {
            specifier: Some(data_source::Specifier::InlineString(value.into())),
        }
    }

    pub fn as_inline_string(&self) -> Option<&str> {
        match self.specifier.as_ref()? {
            data_source::Specifier::InlineString(value) => Some(value),
            _ => None,
        }
    }
}

impl TransportSocket {
    pub fn typed_config(&self) -> Option<&::prost_types::Any> {
        match self.config_type.as_ref()? {
            transport_socket::ConfigType::TypedConfig(any) => Some(any),
        }
    }
}

impl HttpUri {
    /// URI fetched through `cluster`
    pub fn new(uri: impl Into<String>, cluster: impl Into<String>, timeout: ::prost_types::Duration) -> Self {
        Self {
            uri: uri.into(),
            timeout: Some(timeout),
            http_upstream_type: Some(http_uri::HttpUpstreamType::Cluster(cluster.into())),
        }
    }

    pub fn cluster(&self) -> &str {
        match &self.http_upstream_type {
            Some(http_uri::HttpUpstreamType::Cluster(cluster)) => cluster,
            None => "",
        }
    }
}

impl GrpcService {
    /// Envoy gRPC client to `cluster_name`
    pub fn envoy_grpc(cluster_name: impl Into<String>, timeout: ::prost_types::Duration) -> Self {
        Self {
            timeout: Some(timeout),
            target_specifier: Some(grpc_service::TargetSpecifier::EnvoyGrpc(grpc_service::EnvoyGrpc {
                cluster_name: cluster_name.into(),
            })),
        }
    }

    pub fn cluster_name(&self) -> &str {
        match &self.target_specifier {
            Some(grpc_service::TargetSpecifier::EnvoyGrpc(grpc)) => &grpc.cluster_name,
            None => "",
        }
    }
}
