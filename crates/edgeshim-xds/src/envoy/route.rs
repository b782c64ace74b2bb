//! `envoy.config.route.v3`: route configurations, virtual hosts, routes

use super::base::DataSource;
use super::matcher::{Int64Range, RegexMatcher};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteConfiguration {
    /// The name of the route configuration.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// An array of virtual hosts that make up the route table.
    #[prost(message, repeated, tag = "2")]
    pub virtual_hosts: ::prost::alloc::vec::Vec<VirtualHost>,
}
/// The top level element in the routing configuration is a virtual host. Each virtual host has
/// a logical name as well as a set of domains that get routed to it based on the incoming
/// request's host header.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VirtualHost {
    /// The logical name of the virtual host.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// A list of domains (host/authority header) that will be matched to this virtual host.
    #[prost(string, repeated, tag = "2")]
    pub domains: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// The list of routes that will be matched, in order, for incoming requests.
    /// The first route that matches will be used.
    #[prost(message, repeated, tag = "3")]
    pub routes: ::prost::alloc::vec::Vec<Route>,
}
/// A route is both a specification of how to match a request as well as an indication of what
/// to do next (e.g., redirect, forward, rewrite, etc.).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Route {
    /// Name for the route.
    #[prost(string, tag = "14")]
    pub name: ::prost::alloc::string::String,
    /// Route matching parameters.
    #[prost(message, optional, tag = "1")]
    pub r#match: ::core::option::Option<RouteMatch>,
    #[prost(oneof = "route::Action", tags = "2, 7")]
    pub action: ::core::option::Option<route::Action>,
}
/// Nested message and enum types in `Route`.
pub mod route {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        /// Route request to some upstream cluster.
        #[prost(message, tag = "2")]
        Route(super::RouteAction),
        /// Return an arbitrary HTTP response directly, without proxying.
        #[prost(message, tag = "7")]
        DirectResponse(super::DirectResponseAction),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteMatch {
    /// Specifies a set of headers that the route should match on. The router will check the
    /// request's headers against all the specified headers in the route config.
    #[prost(message, repeated, tag = "6")]
    pub headers: ::prost::alloc::vec::Vec<HeaderMatcher>,
    #[prost(oneof = "route_match::PathSpecifier", tags = "1, 2, 10")]
    pub path_specifier: ::core::option::Option<route_match::PathSpecifier>,
}
/// Nested message and enum types in `RouteMatch`.
pub mod route_match {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PathSpecifier {
        /// The route is a prefix rule meaning that the prefix must match the beginning of the
        /// *:path* header.
        #[prost(string, tag = "1")]
        Prefix(::prost::alloc::string::String),
        /// The route is an exact path rule.
        #[prost(string, tag = "2")]
        Path(::prost::alloc::string::String),
        /// The route is a regular expression rule.
        #[prost(message, tag = "10")]
        SafeRegex(super::RegexMatcher),
    }
}
/// [#next-free-field: 15]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderMatcher {
    /// Specifies the name of the header in the request.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// If specified, the match result will be inverted before checking.
    #[prost(bool, tag = "8")]
    pub invert_match: bool,
    #[prost(oneof = "header_matcher::HeaderMatchSpecifier", tags = "4, 6, 7, 9, 10, 11")]
    pub header_match_specifier: ::core::option::Option<header_matcher::HeaderMatchSpecifier>,
}
/// Nested message and enum types in `HeaderMatcher`.
pub mod header_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HeaderMatchSpecifier {
        #[prost(string, tag = "4")]
        ExactMatch(::prost::alloc::string::String),
        #[prost(message, tag = "6")]
        RangeMatch(super::Int64Range),
        #[prost(bool, tag = "7")]
        PresentMatch(bool),
        #[prost(string, tag = "9")]
        PrefixMatch(::prost::alloc::string::String),
        #[prost(string, tag = "10")]
        SuffixMatch(::prost::alloc::string::String),
        #[prost(message, tag = "11")]
        SafeRegexMatch(super::RegexMatcher),
    }
}
/// [#next-free-field: 42]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteAction {
    /// Indicates that during forwarding, the matched prefix (or path) should be
    /// swapped with this value.
    #[prost(string, tag = "5")]
    pub prefix_rewrite: ::prost::alloc::string::String,
    #[prost(oneof = "route_action::ClusterSpecifier", tags = "1")]
    pub cluster_specifier: ::core::option::Option<route_action::ClusterSpecifier>,
    #[prost(oneof = "route_action::HostRewriteSpecifier", tags = "6")]
    pub host_rewrite_specifier: ::core::option::Option<route_action::HostRewriteSpecifier>,
}
/// Nested message and enum types in `RouteAction`.
pub mod route_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        /// Indicates the upstream cluster to which the request should be routed
        /// to.
        #[prost(string, tag = "1")]
        Cluster(::prost::alloc::string::String),
    }
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HostRewriteSpecifier {
        /// Indicates that during forwarding, the host header will be swapped with
        /// this value.
        #[prost(string, tag = "6")]
        HostRewriteLiteral(::prost::alloc::string::String),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DirectResponseAction {
    /// Specifies the HTTP response status to be returned.
    #[prost(uint32, tag = "1")]
    pub status: u32,
    /// Specifies the content of the response body.
    #[prost(message, optional, tag = "2")]
    pub body: ::core::option::Option<DataSource>,
}

impl RouteMatch {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            path_specifier: Some(route_match::PathSpecifier::Prefix(prefix.into())),
            ..Default::default()
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path_specifier: Some(route_match::PathSpecifier::Path(path.into())),
            ..Default::default()
        }
    }

    pub fn safe_regex(regex: impl Into<String>) -> Self {
        Self {
            path_specifier: Some(route_match::PathSpecifier::SafeRegex(RegexMatcher::new(regex))),
            ..Default::default()
        }
    }

    /// Prefix string, empty when the match is not a prefix match
    pub fn get_prefix(&self) -> &str {
        match &self.path_specifier {
            Some(route_match::PathSpecifier::Prefix(prefix)) => prefix,
            _ => "",
        }
    }

    /// Path string, empty when the match is not an exact path match
    pub fn get_path(&self) -> &str {
        match &self.path_specifier {
            Some(route_match::PathSpecifier::Path(path)) => path,
            _ => "",
        }
    }

    pub fn get_safe_regex(&self) -> Option<&RegexMatcher> {
        match &self.path_specifier {
            Some(route_match::PathSpecifier::SafeRegex(regex)) => Some(regex),
            _ => None,
        }
    }
}

impl HeaderMatcher {
    pub fn exact(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header_match_specifier: Some(header_matcher::HeaderMatchSpecifier::ExactMatch(
                value.into(),
            )),
            ..Default::default()
        }
    }

    pub fn safe_regex(name: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header_match_specifier: Some(header_matcher::HeaderMatchSpecifier::SafeRegexMatch(
                RegexMatcher::new(regex),
            )),
            ..Default::default()
        }
    }

    pub fn get_exact_match(&self) -> &str {
        match &self.header_match_specifier {
            Some(header_matcher::HeaderMatchSpecifier::ExactMatch(value)) => value,
            _ => "",
        }
    }

    pub fn get_prefix_match(&self) -> &str {
        match &self.header_match_specifier {
            Some(header_matcher::HeaderMatchSpecifier::PrefixMatch(value)) => value,
            _ => "",
        }
    }

    pub fn get_suffix_match(&self) -> &str {
        match &self.header_match_specifier {
            Some(header_matcher::HeaderMatchSpecifier::SuffixMatch(value)) => value,
            _ => "",
        }
    }

    pub fn get_present_match(&self) -> bool {
        matches!(
            self.header_match_specifier,
            Some(header_matcher::HeaderMatchSpecifier::PresentMatch(true))
        )
    }

    pub fn get_range_match(&self) -> Option<&Int64Range> {
        match &self.header_match_specifier {
            Some(header_matcher::HeaderMatchSpecifier::RangeMatch(range)) => Some(range),
            _ => None,
        }
    }

    pub fn get_safe_regex_match(&self) -> Option<&RegexMatcher> {
        match &self.header_match_specifier {
            Some(header_matcher::HeaderMatchSpecifier::SafeRegexMatch(regex)) => Some(regex),
            _ => None,
        }
    }
}

impl Route {
    /// Forward requests matching `route_match` to `cluster`, rewriting the Host header
    pub fn forward(route_match: RouteMatch, cluster: impl Into<String>, host_rewrite: impl Into<String>) -> Self {
        Self {
            r#match: Some(route_match),
            action: Some(route::Action::Route(RouteAction {
                cluster_specifier: Some(route_action::ClusterSpecifier::Cluster(cluster.into())),
                host_rewrite_specifier: Some(route_action::HostRewriteSpecifier::HostRewriteLiteral(
                    host_rewrite.into(),
                )),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    /// Answer requests matching `route_match` with a fixed status and inline body
    pub fn direct_response(route_match: RouteMatch, status: u32, body: impl Into<String>) -> Self {
        Self {
            r#match: Some(route_match),
            action: Some(route::Action::DirectResponse(DirectResponseAction {
                status,
                body: Some(DataSource::inline_string(body)),
            })),
            ..Default::default()
        }
    }
}

impl RouteAction {
    pub fn cluster(&self) -> &str {
        match &self.cluster_specifier {
            Some(route_action::ClusterSpecifier::Cluster(cluster)) => cluster,
            None => "",
        }
    }

    pub fn host_rewrite(&self) -> &str {
        match &self.host_rewrite_specifier {
            Some(route_action::HostRewriteSpecifier::HostRewriteLiteral(host)) => host,
            None => "",
        }
    }
}
