//! `envoy.extensions.filters.http.jwt_authn.v3` and
//! `envoy.extensions.filters.http.ext_authz.v3`: request authentication and
//! authorization HTTP filters

use super::base::{ApiVersion, GrpcService, HttpUri};
use super::route::RouteMatch;

/// This is the Envoy HTTP filter config for JWT authentication.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtAuthentication {
    /// Map of provider names to JwtProviders.
    #[prost(btree_map = "string, message", tag = "1")]
    pub providers: ::prost::alloc::collections::BTreeMap<::prost::alloc::string::String, JwtProvider>,
    /// Specifies requirements based on the route matches. The first matched requirement will be
    /// applied. If there are overlapped match conditions, please put the most specific match first.
    #[prost(message, repeated, tag = "2")]
    pub rules: ::prost::alloc::vec::Vec<RequirementRule>,
}
/// Specifies how a JSON Web Token (JWT) can be verified.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtProvider {
    /// Specify the principal that issued the JWT, usually a URL or an email address.
    #[prost(string, tag = "1")]
    pub issuer: ::prost::alloc::string::String,
    /// If false, the JWT is removed in the request after a success verification. If true, the JWT
    /// is not removed in the request. Default value is false.
    #[prost(bool, tag = "5")]
    pub forward: bool,
    #[prost(oneof = "jwt_provider::JwksSourceSpecifier", tags = "3")]
    pub jwks_source_specifier: ::core::option::Option<jwt_provider::JwksSourceSpecifier>,
}
/// Nested message and enum types in `JwtProvider`.
pub mod jwt_provider {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum JwksSourceSpecifier {
        /// JWKS can be fetched from remote server via HTTP/HTTPS.
        #[prost(message, tag = "3")]
        RemoteJwks(super::RemoteJwks),
    }
}
/// This message specifies how to fetch JWKS from remote and how to cache it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoteJwks {
    /// The HTTP URI to fetch the JWKS.
    #[prost(message, optional, tag = "1")]
    pub http_uri: ::core::option::Option<HttpUri>,
    /// Duration after which the cached JWKS should be expired. If not specified, default cache
    /// duration is 10 minutes.
    #[prost(message, optional, tag = "2")]
    pub cache_duration: ::core::option::Option<::prost_types::Duration>,
}
/// Specify a required provider with audiences.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtRequirement {
    #[prost(oneof = "jwt_requirement::RequiresType", tags = "1")]
    pub requires_type: ::core::option::Option<jwt_requirement::RequiresType>,
}
/// Nested message and enum types in `JwtRequirement`.
pub mod jwt_requirement {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RequiresType {
        /// Specify a required provider name.
        #[prost(string, tag = "1")]
        ProviderName(::prost::alloc::string::String),
    }
}
/// Specify a required provider to match on a route.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RequirementRule {
    /// The route matching parameter. Only when the match is satisfied, the "requires" field will
    /// apply.
    #[prost(message, optional, tag = "1")]
    pub r#match: ::core::option::Option<RouteMatch>,
    #[prost(oneof = "requirement_rule::RequirementType", tags = "2")]
    pub requirement_type: ::core::option::Option<requirement_rule::RequirementType>,
}
/// Nested message and enum types in `RequirementRule`.
pub mod requirement_rule {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RequirementType {
        /// Specify a Jwt requirement.
        #[prost(message, tag = "2")]
        Requires(super::JwtRequirement),
    }
}
/// [#next-free-field: 30]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExtAuthz {
    /// Changes filter's behavior on errors:
    ///
    /// 1. When set to true, the filter will ``accept`` client request even if the communication with
    ///    the authorization service has failed, or if the authorization service has returned a HTTP 5xx
    ///    error.
    ///
    /// 2. When set to false, ext-authz will ``reject`` client requests and return a ``Forbidden``
    ///    response if the communication with the authorization service has failed, or if the
    ///    authorization service has returned a HTTP 5xx error.
    #[prost(bool, tag = "2")]
    pub failure_mode_allow: bool,
    /// API version for ext_authz transport protocol.
    #[prost(enumeration = "ApiVersion", tag = "12")]
    pub transport_api_version: i32,
    #[prost(oneof = "ext_authz::Services", tags = "1")]
    pub services: ::core::option::Option<ext_authz::Services>,
}
/// Nested message and enum types in `ExtAuthz`.
pub mod ext_authz {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Services {
        /// gRPC service configuration (default timeout: 200ms).
        #[prost(message, tag = "1")]
        GrpcService(super::GrpcService),
    }
}

impl JwtProvider {
    pub fn remote_jwks(&self) -> Option<&RemoteJwks> {
        match self.jwks_source_specifier.as_ref()? {
            jwt_provider::JwksSourceSpecifier::RemoteJwks(jwks) => Some(jwks),
        }
    }
}

impl RequirementRule {
    /// Require a token from `provider` on requests matching `route_match`
    pub fn provider(route_match: RouteMatch, provider: impl Into<String>) -> Self {
        Self {
            r#match: Some(route_match),
            requirement_type: Some(requirement_rule::RequirementType::Requires(JwtRequirement {
                requires_type: Some(jwt_requirement::RequiresType::ProviderName(provider.into())),
            })),
        }
    }

    pub fn provider_name(&self) -> &str {
        match &self.requirement_type {
            Some(requirement_rule::RequirementType::Requires(JwtRequirement {
                requires_type: Some(jwt_requirement::RequiresType::ProviderName(name)),
            })) => name,
            _ => "",
        }
    }
}

impl ExtAuthz {
    /// Authorize every request through the gRPC service at `cluster_name`
    pub fn grpc(cluster_name: impl Into<String>, timeout: ::prost_types::Duration) -> Self {
        Self {
            transport_api_version: ApiVersion::V3 as i32,
            services: Some(ext_authz::Services::GrpcService(GrpcService::envoy_grpc(cluster_name, timeout))),
            ..Default::default()
        }
    }

    pub fn grpc_service(&self) -> Option<&GrpcService> {
        match self.services.as_ref()? {
            ext_authz::Services::GrpcService(service) => Some(service),
        }
    }
}
