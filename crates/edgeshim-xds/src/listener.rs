//! Listener composition
//!
//! Builds Envoy listeners from intents and folds later intents, certificate
//! rotations and ACME challenges into the cached listeners.
//!
//! Every listener has exactly one filter chain holding exactly one HTTP
//! connection manager filter. Mutations decode the manager, edit it and write
//! it back re-encoded; the listener is left untouched when any step fails.
//!
//! Intents carrying auth add JWT authentication and external authorization
//! HTTP filters to the manager. They always sit in front of the router.

use crate::attributes::{self, ListenerAttributes};
use crate::cache::ListenerCache;
use crate::codec::{self, CodecError, TypedMessage};
use crate::envoy::auth::{
    jwt_provider, ExtAuthz, JwtAuthentication, JwtProvider, RemoteJwks, RequirementRule,
};
use crate::envoy::base::{transport_socket, Address, HttpUri, TransportSocket};
use crate::envoy::hcm::{http_connection_manager, http_filter, HttpConnectionManager, HttpFilter, Router};
use crate::envoy::listener::{filter, Filter, FilterChain, Listener};
use crate::envoy::names;
use crate::envoy::route::{Route, RouteConfiguration, RouteMatch, VirtualHost};
use crate::envoy::tls::DownstreamTlsContext;
use crate::equality::{route_equal, route_match_equal, virtual_host_has_route};
use crate::{Result, XdsError};
use edgeshim_common::{Auth, ChallengeParams, ComposerConfig, ListenerIntent, MergePolicy, TlsParams};
use prost_types::{Any, Duration};
use tracing::{debug, info};

/// Status of ACME challenge responses
const CHALLENGE_STATUS: u32 = 200;

/// Timeout of JWKS fetches and authorization calls
const AUTH_UPSTREAM_TIMEOUT: Duration = Duration { seconds: 5, nanos: 0 };

/// Listener composition engine
///
/// Holds configuration only; all state lives in the `ListenerCache` passed
/// to each operation.
#[derive(Debug, Clone, Default)]
pub struct ListenerComposer {
    config: ComposerConfig,
}

impl ListenerComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Resolve the canonical attributes of an intent
    pub fn attributes(&self, intent: &ListenerIntent, tls: Option<&TlsParams>) -> ListenerAttributes {
        ListenerAttributes::resolve(intent, tls, &self.config)
    }

    /// Build a listener for an intent. The caller inserts it into the cache.
    pub fn create_listener(&self, intent: &ListenerIntent, tls: Option<&TlsParams>) -> Listener {
        let attrs = self.attributes(intent, tls);

        info!("Creating listener {}", attrs.listener_name);

        let route_config = RouteConfiguration {
            name: attrs.route_config_name.clone(),
            virtual_hosts: vec![virtual_host(intent, &attrs)],
        };
        let mut manager = self.http_connection_manager(route_config);
        apply_auth(&mut manager, &intent.auth, JwtAuthentication::default(), &attrs);

        let mut chain = FilterChain {
            filters: vec![Filter {
                name: names::HTTP_CONNECTION_MANAGER.to_string(),
                config_type: Some(filter::ConfigType::TypedConfig(codec::encode_hcm(&manager))),
            }],
            ..Default::default()
        };
        if let Some(params) = tls.filter(|_| attrs.tls) {
            chain.transport_socket = Some(tls_transport_socket(params));
        }

        Listener {
            name: attrs.listener_name,
            address: Some(Address::tcp(self.config.bind_address.as_str(), attrs.listener_port)),
            filter_chains: vec![chain],
        }
    }

    /// Fold an intent into the existing listener it resolves to
    pub fn update_listener(
        &self,
        cache: &mut ListenerCache,
        intent: &ListenerIntent,
        tls: Option<&TlsParams>,
    ) -> Result<()> {
        let attrs = self.attributes(intent, tls);

        info!("Updating listener {}", attrs.listener_name);

        let index = cache
            .find(&attrs.listener_name)
            .ok_or_else(|| XdsError::NoMatchingListener(attrs.listener_name.clone()))?;
        let listener = cache
            .get_mut(index)
            .ok_or_else(|| XdsError::NoMatchingListener(attrs.listener_name.clone()))?;

        let mut manager = listener_http_connection_manager(listener)?;
        let route_config = populated_route_config(&mut manager, &listener.name)?;

        let added = merge_virtual_host(
            route_config,
            virtual_host(intent, &attrs),
            self.config.merge_policy,
        );

        let jwt = if intent.auth.has_jwt() {
            manager_http_filter_config(&manager, names::JWT_AUTHN)?.unwrap_or_default()
        } else {
            JwtAuthentication::default()
        };
        let auth_changed = apply_auth(&mut manager, &intent.auth, jwt, &attrs);

        if !added && !auth_changed {
            debug!(
                "Route for {} already present in {}, nothing to update",
                intent.name, listener.name
            );
            return Ok(());
        }

        write_http_connection_manager(listener, &manager)?;
        debug!("Updated listener {} with virtualhost {}", listener.name, attrs.virtual_host_name);

        cache.bump();
        Ok(())
    }

    /// Swap the certificate of `l_{name}_tls`. Routes are not touched.
    pub fn update_listener_with_new_cert(&self, cache: &mut ListenerCache, params: &TlsParams) -> Result<()> {
        let name = attributes::listener_name(&params.name, true);
        let index = cache
            .find(&name)
            .ok_or_else(|| XdsError::NoTlsListener(name.clone()))?;
        let listener = cache
            .get_mut(index)
            .ok_or_else(|| XdsError::NoTlsListener(name.clone()))?;

        debug!("Matching listener found, updating: {}", listener.name);

        let chain = listener
            .filter_chains
            .first_mut()
            .ok_or_else(|| XdsError::NoFilterChains(name.clone()))?;
        chain.transport_socket = Some(tls_transport_socket(params));

        cache.bump();
        Ok(())
    }

    /// Serve an ACME HTTP-01 challenge from the plaintext listener of
    /// `challenge.name`. The route is placed first in every service virtual
    /// host. No matching listener is not an error.
    pub fn update_listener_with_challenge(
        &self,
        cache: &mut ListenerCache,
        challenge: &ChallengeParams,
    ) -> Result<()> {
        let listener_name = attributes::listener_name(&challenge.name, false);

        debug!("Update listener with challenge for: {}", challenge.name);

        let challenge_route = Route::direct_response(
            RouteMatch::path(challenge.path()),
            CHALLENGE_STATUS,
            challenge.body.as_str(),
        );

        let mut updated = false;
        for index in 0..cache.len() {
            let Some(listener) = cache.get_mut(index) else {
                continue;
            };
            if listener.name != listener_name {
                continue;
            }

            debug!("Matching listener found, updating: {}", listener.name);

            let mut manager = listener_http_connection_manager(listener)?;
            let route_config = populated_route_config(&mut manager, &listener.name)?;

            let mut matched = false;
            for vh in route_config
                .virtual_hosts
                .iter_mut()
                .filter(|vh| attributes::is_service_virtual_host(&vh.name, &challenge.name))
            {
                vh.routes.retain(|r| !route_equal(r, &challenge_route));
                vh.routes.insert(0, challenge_route.clone());
                matched = true;
            }
            if !matched {
                debug!("No service virtualhost for {} in {}", challenge.name, listener.name);
                continue;
            }

            write_http_connection_manager(listener, &manager)?;
            updated = true;
        }

        if updated {
            cache.bump();
        }
        Ok(())
    }

    fn http_connection_manager(&self, route_config: RouteConfiguration) -> HttpConnectionManager {
        HttpConnectionManager {
            codec_type: http_connection_manager::CodecType::Auto as i32,
            stat_prefix: self.config.stat_prefix.clone(),
            route_specifier: Some(http_connection_manager::RouteSpecifier::RouteConfig(route_config)),
            http_filters: vec![HttpFilter::typed(names::ROUTER, codec::encode(&Router {}))],
        }
    }
}

/// Add the auth filters an intent asks for. `jwt` is the listener's current
/// JWT configuration the intent's provider and rule are merged into.
/// Returns whether the filter list changed.
fn apply_auth(
    manager: &mut HttpConnectionManager,
    auth: &Auth,
    mut jwt: JwtAuthentication,
    attrs: &ListenerAttributes,
) -> bool {
    let mut changed = false;
    if auth.has_jwt() {
        add_jwt_requirement(&mut jwt, auth, attrs.route_match());
        changed |= upsert_http_filter(&mut manager.http_filters, names::JWT_AUTHN, codec::encode(&jwt));
    }
    if auth.has_authz() {
        let authz = ExtAuthz::grpc(auth.authz_cluster.as_str(), AUTH_UPSTREAM_TIMEOUT);
        changed |= upsert_http_filter(&mut manager.http_filters, names::EXT_AUTHZ, codec::encode(&authz));
    }
    changed
}

/// Register the provider of `auth` and require it on `route_match`
fn add_jwt_requirement(jwt: &mut JwtAuthentication, auth: &Auth, route_match: RouteMatch) {
    let provider = JwtProvider {
        issuer: auth.issuer.clone(),
        forward: auth.forward,
        jwks_source_specifier: Some(jwt_provider::JwksSourceSpecifier::RemoteJwks(RemoteJwks {
            http_uri: Some(HttpUri::new(auth.remote_jwks.as_str(), auth.jwks_cluster(), AUTH_UPSTREAM_TIMEOUT)),
            cache_duration: None,
        })),
    };
    jwt.providers.insert(auth.jwt_provider.clone(), provider);

    let present = jwt.rules.iter().any(|rule| {
        rule.provider_name() == auth.jwt_provider
            && rule.r#match.as_ref().is_some_and(|m| route_match_equal(m, &route_match))
    });
    if !present {
        jwt.rules.push(RequirementRule::provider(route_match, auth.jwt_provider.as_str()));
    }
}

/// Insert an HTTP filter in front of the router, or replace the config of
/// the filter already carrying `name`. The router stays last. Returns whether
/// the list changed.
pub fn upsert_http_filter(filters: &mut Vec<HttpFilter>, name: &str, config: Any) -> bool {
    if let Some(existing) = filters.iter_mut().find(|f| f.name == name) {
        if existing.typed_config() == Some(&config) {
            return false;
        }
        existing.config_type = Some(http_filter::ConfigType::TypedConfig(config));
        return true;
    }
    let at = filters
        .iter()
        .position(|f| f.name == names::ROUTER)
        .unwrap_or(filters.len());
    filters.insert(at, HttpFilter::typed(name, config));
    true
}

/// Decode the config of the HTTP filter `name`, `None` when absent
pub fn manager_http_filter_config<M: TypedMessage>(
    manager: &HttpConnectionManager,
    name: &str,
) -> std::result::Result<Option<M>, CodecError> {
    let Some(filter) = manager.http_filter(name) else {
        return Ok(None);
    };
    let any = filter
        .typed_config()
        .ok_or_else(|| CodecError::MissingTypedConfig(name.to_string()))?;
    codec::decode(any).map(Some)
}

/// JWT authentication config of a listener, `None` when it has none
pub fn listener_jwt_authentication(listener: &Listener) -> Result<Option<JwtAuthentication>> {
    let manager = listener_http_connection_manager(listener)?;
    Ok(manager_http_filter_config(&manager, names::JWT_AUTHN)?)
}

/// External authorization config of a listener, `None` when it has none
pub fn listener_ext_authz(listener: &Listener) -> Result<Option<ExtAuthz>> {
    let manager = listener_http_connection_manager(listener)?;
    Ok(manager_http_filter_config(&manager, names::EXT_AUTHZ)?)
}

/// Virtual host serving `intent`, with its single forwarding route
pub fn virtual_host(intent: &ListenerIntent, attrs: &ListenerAttributes) -> VirtualHost {
    VirtualHost {
        name: attrs.virtual_host_name.clone(),
        domains: vec![attributes::virtual_host_domain(&intent.conditions)],
        routes: vec![Route::forward(
            attrs.route_match(),
            intent.name.as_str(),
            intent.target_hostname.as_str(),
        )],
    }
}

/// TLS transport socket carrying the inline certificate material, verifying
/// client certificates when the params carry a CA
pub fn tls_transport_socket(params: &TlsParams) -> TransportSocket {
    let mut context = DownstreamTlsContext::inline(params.cert_bundle.as_str(), params.private_key.as_str());
    if params.is_mutual() {
        context = context.with_client_validation(
            params.ca_certificate.as_str(),
            params.allowed_subject_alt_names.iter().map(String::as_str),
        );
    }
    TransportSocket {
        name: names::TLS_TRANSPORT_SOCKET.to_string(),
        config_type: Some(transport_socket::ConfigType::TypedConfig(codec::encode_tls_context(&context))),
    }
}

/// Decode the HTTP connection manager of a listener
pub fn listener_http_connection_manager(listener: &Listener) -> Result<HttpConnectionManager> {
    let filter = manager_filter(listener)?;
    let any = filter
        .typed_config()
        .ok_or_else(|| CodecError::MissingTypedConfig(listener.name.clone()))?;
    Ok(codec::decode_hcm(any)?)
}

/// Decode the downstream TLS context of a listener, `None` when plaintext
pub fn listener_tls_context(listener: &Listener) -> Result<Option<DownstreamTlsContext>> {
    let chain = listener
        .filter_chains
        .first()
        .ok_or_else(|| XdsError::NoFilterChains(listener.name.clone()))?;
    let Some(socket) = chain.transport_socket.as_ref() else {
        return Ok(None);
    };
    let any = socket
        .typed_config()
        .ok_or_else(|| CodecError::MissingTypedConfig(listener.name.clone()))?;
    Ok(Some(codec::decode_tls_context(any)?))
}

/// Inline route configuration of a listener
pub fn listener_route_config(listener: &Listener) -> Result<RouteConfiguration> {
    let mut manager = listener_http_connection_manager(listener)?;
    let route_config = populated_route_config(&mut manager, &listener.name)?;
    Ok(std::mem::take(route_config))
}

fn manager_filter(listener: &Listener) -> Result<&Filter> {
    let chain = listener
        .filter_chains
        .first()
        .ok_or_else(|| XdsError::NoFilterChains(listener.name.clone()))?;
    chain
        .filters
        .first()
        .ok_or_else(|| XdsError::NoFilters(listener.name.clone()))
}

fn write_http_connection_manager(listener: &mut Listener, manager: &HttpConnectionManager) -> Result<()> {
    let name = listener.name.clone();
    let chain = listener
        .filter_chains
        .first_mut()
        .ok_or_else(|| XdsError::NoFilterChains(name.clone()))?;
    let filter = chain
        .filters
        .first_mut()
        .ok_or(XdsError::NoFilters(name))?;
    filter.config_type = Some(filter::ConfigType::TypedConfig(codec::encode_hcm(manager)));
    Ok(())
}

fn populated_route_config<'a>(
    manager: &'a mut HttpConnectionManager,
    listener_name: &str,
) -> Result<&'a mut RouteConfiguration> {
    let route_config = manager
        .route_config_mut()
        .ok_or_else(|| XdsError::NoRouteConfig(listener_name.to_string()))?;
    if route_config.virtual_hosts.is_empty() {
        return Err(XdsError::NoVirtualHosts(listener_name.to_string()));
    }
    Ok(route_config)
}

/// Fold a new virtual host into a route config. Returns whether anything
/// was added.
fn merge_virtual_host(route_config: &mut RouteConfiguration, new_vh: VirtualHost, policy: MergePolicy) -> bool {
    let existing = match policy {
        MergePolicy::Append => route_config
            .virtual_hosts
            .iter_mut()
            .find(|vh| vh.name == new_vh.name),
        MergePolicy::MergeDomains => route_config.virtual_hosts.iter_mut().find(|vh| {
            vh.name == new_vh.name || vh.domains.iter().any(|d| new_vh.domains.contains(d))
        }),
    };

    let Some(existing) = existing else {
        route_config.virtual_hosts.push(new_vh);
        return true;
    };

    let mut added = false;
    for route in new_vh.routes {
        if policy == MergePolicy::MergeDomains && virtual_host_has_route(existing, &route) {
            continue;
        }
        existing.routes.push(route);
        added = true;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envoy::route::route::Action;
    use crate::envoy::route::route_match::PathSpecifier;

    fn composer() -> ListenerComposer {
        ListenerComposer::new(ComposerConfig::default())
    }

    fn intent(name: &str, hostname: &str, prefix: &str) -> ListenerIntent {
        ListenerIntent::new(name, "www.test.inv")
            .with_hostname(hostname)
            .with_prefix(prefix)
    }

    fn route_config(cache: &ListenerCache, index: usize) -> RouteConfiguration {
        listener_route_config(&cache.listeners()[index]).unwrap()
    }

    fn route_count(config: &RouteConfiguration) -> usize {
        config.virtual_hosts.iter().map(|vh| vh.routes.len()).sum()
    }

    /// Virtual hosts of `config` serving `hostname` with a prefix route on `prefix`
    fn vhosts_with(config: &RouteConfiguration, hostname: &str, prefix: &str) -> usize {
        config
            .virtual_hosts
            .iter()
            .filter(|vh| vh.domains.iter().any(|d| d == hostname))
            .filter(|vh| {
                vh.routes
                    .iter()
                    .any(|r| r.r#match.as_ref().map(|m| m.get_prefix()) == Some(prefix))
            })
            .count()
    }

    fn seeded(composer: &ListenerComposer, intent: &ListenerIntent, tls: Option<&TlsParams>) -> ListenerCache {
        let mut cache = ListenerCache::new();
        cache.append(composer.create_listener(intent, tls)).unwrap();
        cache.bump();
        cache
    }

    #[test]
    fn test_create_plaintext_listener() {
        let listener = composer().create_listener(&intent("test_1", "hostname1.example.com", "/test1"), None);

        assert_eq!(listener.name, "l_test_1");
        assert_eq!(listener.port(), Some(10000));
        let socket = listener.address.as_ref().unwrap().socket_address().unwrap();
        assert_eq!(socket.address, "0.0.0.0");
        assert_eq!(socket.protocol(), crate::envoy::base::socket_address::Protocol::Tcp);

        assert_eq!(listener.filter_chains.len(), 1);
        assert_eq!(listener.filter_chains[0].filters.len(), 1);
        assert_eq!(listener.filter_chains[0].filters[0].name, names::HTTP_CONNECTION_MANAGER);
        assert!(listener_tls_context(&listener).unwrap().is_none());

        let manager = listener_http_connection_manager(&listener).unwrap();
        assert_eq!(manager.codec_type(), http_connection_manager::CodecType::Auto);
        assert_eq!(manager.stat_prefix, "ingress_http");
        assert_eq!(manager.http_filters.last().unwrap().name, names::ROUTER);

        let config = manager.route_config().unwrap();
        assert_eq!(config.name, "test_1_route_hostname1.example.com");
        assert_eq!(config.virtual_hosts.len(), 1);

        let vh = &config.virtual_hosts[0];
        assert_eq!(vh.name, "test_1_service_hostname1.example.com");
        assert_eq!(vh.domains, vec!["hostname1.example.com"]);
        assert_eq!(vh.routes.len(), 1);
        match &vh.routes[0].action {
            Some(Action::Route(action)) => {
                assert_eq!(action.cluster(), "test_1");
                assert_eq!(action.host_rewrite(), "www.test.inv");
            }
            other => panic!("expected forwarding route, got {:?}", other),
        }
        assert_eq!(vh.routes[0].r#match.as_ref().unwrap().get_prefix(), "/test1");
    }

    #[test]
    fn test_create_wildcard_domain() {
        let listener = composer().create_listener(&ListenerIntent::new("svc", "svc.internal"), None);
        let config = listener_route_config(&listener).unwrap();
        assert_eq!(config.virtual_hosts[0].domains, vec!["*"]);
        assert_eq!(config.virtual_hosts[0].name, "svc_service_wildcard");
    }

    #[test]
    fn test_create_tls_listener() {
        let tls = TlsParams::new("test_4", "certbundle", "privateKey");
        let listener = composer().create_listener(&intent("test_4", "hostname4.example.com", "/test4"), Some(&tls));

        assert_eq!(listener.name, "l_test_4_tls");
        assert_eq!(listener.port(), Some(10001));
        let socket = listener.filter_chains[0].transport_socket.as_ref().unwrap();
        assert_eq!(socket.name, names::TLS_TRANSPORT_SOCKET);

        let context = listener_tls_context(&listener).unwrap().unwrap();
        let cert = context.certificate().unwrap();
        assert_eq!(cert.certificate_chain.as_ref().unwrap().as_inline_string(), Some("certbundle"));
        assert_eq!(cert.private_key.as_ref().unwrap().as_inline_string(), Some("privateKey"));
    }

    #[test]
    fn test_create_reencode_is_stable() {
        let listener = composer().create_listener(&intent("svc", "a.example.com", "/a"), None);
        let encoded = listener.filter_chains[0].filters[0].typed_config().unwrap().clone();
        let manager = codec::decode_hcm(&encoded).unwrap();
        assert_eq!(codec::encode_hcm(&manager), encoded);
    }

    #[test]
    fn test_domain_already_exists() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("test_1", "hostname1.example.com", "/test1"), None);
        let second = intent("test_2", "hostname1.example.com", "/test2").on_listener("test_1");

        composer.update_listener(&mut cache, &second, None).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.listeners()[0].name, "l_test_1");
        let config = route_config(&cache, 0);
        assert!(config.virtual_hosts.len() >= 2);
        assert_eq!(config.virtual_hosts[0].domains, vec!["hostname1.example.com"]);
        assert_eq!(vhosts_with(&config, "hostname1.example.com", "/test1"), 1);
        assert_eq!(vhosts_with(&config, "hostname1.example.com", "/test2"), 1);
    }

    #[test]
    fn test_distinct_hostnames() {
        let composer = composer();
        let tls4 = TlsParams::new("test_4", "certbundle", "privateKey");
        let intents = [
            intent("test_1", "hostname1", "/test1"),
            intent("test_2", "hostname2", "/test2").on_listener("test_1"),
            intent("test_3", "hostname2", "/test3").on_listener("test_1"),
        ];

        let mut cache = seeded(&composer, &intents[0], None);
        for intent in &intents[1..] {
            composer.update_listener(&mut cache, intent, None).unwrap();
        }
        let fourth = intent("test_4", "hostname4", "/test4");
        cache.append(composer.create_listener(&fourth, Some(&tls4))).unwrap();
        cache.bump();

        assert_eq!(cache.len(), 2);
        let plain = &cache.listeners()[0];
        assert_eq!(plain.name, "l_test_1");
        assert_eq!(plain.port(), Some(10000));
        assert!(listener_tls_context(plain).unwrap().is_none());

        let secure = &cache.listeners()[1];
        assert_eq!(secure.name, "l_test_4_tls");
        assert_eq!(secure.port(), Some(10001));
        let cert = listener_tls_context(secure).unwrap().unwrap().certificate().cloned().unwrap();
        assert_eq!(cert.certificate_chain.unwrap().as_inline_string(), Some("certbundle"));
        assert_eq!(cert.private_key.unwrap().as_inline_string(), Some("privateKey"));

        let plain_config = route_config(&cache, 0);
        assert_eq!(vhosts_with(&plain_config, "hostname1", "/test1"), 1);
        assert_eq!(vhosts_with(&plain_config, "hostname2", "/test2"), 1);
        assert_eq!(vhosts_with(&plain_config, "hostname2", "/test3"), 1);
        assert_eq!(vhosts_with(&route_config(&cache, 1), "hostname4", "/test4"), 1);
    }

    #[test]
    fn test_cert_rotation() {
        let composer = composer();
        let tls = TlsParams::new("foo", "OLD_CB", "OLD_PK");
        let mut cache = seeded(&composer, &ListenerIntent::new("foo", "foo.internal"), Some(&tls));
        let before_routes = route_config(&cache, 0);
        let before_manager = cache.listeners()[0].filter_chains[0].filters[0].clone();
        let version = cache.version();

        composer
            .update_listener_with_new_cert(&mut cache, &TlsParams::new("foo", "NEW_CB", "NEW_PK"))
            .unwrap();

        let listener = &cache.listeners()[0];
        let cert = listener_tls_context(listener).unwrap().unwrap().certificate().cloned().unwrap();
        assert_eq!(cert.certificate_chain.unwrap().as_inline_string(), Some("NEW_CB"));
        assert_eq!(cert.private_key.unwrap().as_inline_string(), Some("NEW_PK"));

        let after_routes = route_config(&cache, 0);
        assert_eq!(after_routes.virtual_hosts.len(), before_routes.virtual_hosts.len());
        assert_eq!(route_count(&after_routes), route_count(&before_routes));
        assert_eq!(listener.filter_chains[0].filters[0], before_manager);
        assert_eq!(cache.version(), version + 1);
    }

    #[test]
    fn test_cert_rotation_missing_listener() {
        let mut cache = ListenerCache::new();
        let err = composer()
            .update_listener_with_new_cert(&mut cache, &TlsParams::new("foo", "CB", "PK"))
            .unwrap_err();
        assert!(matches!(err, XdsError::NoTlsListener(name) if name == "l_foo_tls"));
        assert_eq!(cache.version(), 0);
    }

    #[test]
    fn test_cert_rotation_ignores_plaintext_listener() {
        let composer = composer();
        let mut cache = seeded(&composer, &ListenerIntent::new("foo", "foo.internal"), None);
        let err = composer
            .update_listener_with_new_cert(&mut cache, &TlsParams::new("foo", "CB", "PK"))
            .unwrap_err();
        assert!(matches!(err, XdsError::NoTlsListener(_)));
        assert!(listener_tls_context(&cache.listeners()[0]).unwrap().is_none());
    }

    /// `l_foo` holding virtual host `foo_service` with one catch-all route
    fn challenge_fixture() -> ListenerCache {
        let composer = composer();
        let mut listener = composer.create_listener(&ListenerIntent::new("foo", "foo.internal"), None);
        let mut manager = listener_http_connection_manager(&listener).unwrap();
        manager.route_config_mut().unwrap().virtual_hosts[0].name = "foo_service".to_string();
        write_http_connection_manager(&mut listener, &manager).unwrap();

        let mut cache = ListenerCache::new();
        cache.append(listener).unwrap();
        cache.bump();
        cache
    }

    #[test]
    fn test_challenge_prepend() {
        let mut cache = challenge_fixture();
        let challenge = ChallengeParams::new("foo", "TOK", "BODY");

        composer().update_listener_with_challenge(&mut cache, &challenge).unwrap();

        let config = route_config(&cache, 0);
        let routes = &config.virtual_hosts[0].routes;
        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes[0].r#match.as_ref().unwrap().path_specifier,
            Some(PathSpecifier::Path("/.well-known/acme-challenge/TOK".to_string()))
        );
        match &routes[0].action {
            Some(Action::DirectResponse(response)) => {
                assert_eq!(response.status, 200);
                assert_eq!(response.body.as_ref().unwrap().as_inline_string(), Some("BODY"));
            }
            other => panic!("expected direct response, got {:?}", other),
        }
        assert_eq!(routes[1].r#match.as_ref().unwrap().get_prefix(), "/");
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn test_challenge_matches_created_virtual_hosts() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("foo", "foo.example.com", "/"), None);
        composer
            .update_listener(&mut cache, &ListenerIntent::new("foo", "foo.internal"), None)
            .unwrap();
        composer
            .update_listener(&mut cache, &intent("bar", "bar.example.com", "/").on_listener("foo"), None)
            .unwrap();

        composer
            .update_listener_with_challenge(&mut cache, &ChallengeParams::new("foo", "TOK", "BODY"))
            .unwrap();

        let config = route_config(&cache, 0);
        for vh in &config.virtual_hosts {
            let first_path = vh.routes[0].r#match.as_ref().unwrap().get_path();
            if vh.name.starts_with("foo_service") {
                assert_eq!(first_path, "/.well-known/acme-challenge/TOK");
                assert_eq!(vh.routes.len(), 2);
            } else {
                assert_eq!(first_path, "");
                assert_eq!(vh.routes.len(), 1);
            }
        }
    }

    #[test]
    fn test_challenge_resubmission_stays_single() {
        let mut cache = challenge_fixture();
        let challenge = ChallengeParams::new("foo", "TOK", "BODY");
        composer().update_listener_with_challenge(&mut cache, &challenge).unwrap();
        composer().update_listener_with_challenge(&mut cache, &challenge).unwrap();

        let routes = &route_config(&cache, 0).virtual_hosts[0].routes;
        assert_eq!(routes.len(), 2);

        let next = ChallengeParams::new("foo", "TOK2", "BODY2");
        composer().update_listener_with_challenge(&mut cache, &next).unwrap();
        let routes = &route_config(&cache, 0).virtual_hosts[0].routes;
        assert_eq!(routes.len(), 3);
        assert_eq!(
            routes[0].r#match.as_ref().unwrap().get_path(),
            "/.well-known/acme-challenge/TOK2"
        );
    }

    #[test]
    fn test_challenge_without_listener_is_noop() {
        let composer = composer();
        let mut cache = seeded(&composer, &ListenerIntent::new("bar", "bar.internal"), None);
        let before = cache.listeners().to_vec();

        composer
            .update_listener_with_challenge(&mut cache, &ChallengeParams::new("foo", "TOK", "BODY"))
            .unwrap();

        assert_eq!(cache.listeners(), before.as_slice());
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn test_challenge_skips_tls_listener() {
        let composer = composer();
        let tls = TlsParams::new("foo", "CB", "PK");
        let mut cache = seeded(&composer, &ListenerIntent::new("foo", "foo.internal"), Some(&tls));
        composer
            .update_listener_with_challenge(&mut cache, &ChallengeParams::new("foo", "TOK", "BODY"))
            .unwrap();
        assert_eq!(route_count(&route_config(&cache, 0)), 1);
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn test_update_missing_listener() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("test_1", "hostname1.example.com", "/test1"), None);
        let err = composer
            .update_listener(&mut cache, &intent("test_2", "hostname1.example.com", "/test2"), None)
            .unwrap_err();
        assert!(matches!(err, XdsError::NoMatchingListener(name) if name == "l_test_2"));

        let tls = TlsParams::new("test_1", "CB", "PK");
        let err = composer
            .update_listener(&mut cache, &intent("test_1", "hostname1.example.com", "/x"), Some(&tls))
            .unwrap_err();
        assert!(matches!(err, XdsError::NoMatchingListener(name) if name == "l_test_1_tls"));
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn test_update_same_virtual_host_appends_route() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("svc", "a.example.com", "/one"), None);
        composer
            .update_listener(&mut cache, &intent("svc", "a.example.com", "/two"), None)
            .unwrap();

        let config = route_config(&cache, 0);
        assert_eq!(config.virtual_hosts.len(), 1);
        let prefixes: Vec<&str> = config.virtual_hosts[0]
            .routes
            .iter()
            .map(|r| r.r#match.as_ref().unwrap().get_prefix())
            .collect();
        assert_eq!(prefixes, vec!["/one", "/two"]);
    }

    #[test]
    fn test_append_policy_keeps_duplicates() {
        let composer = composer();
        let first = intent("test_1", "h.example.com", "/p");
        let mut cache = seeded(&composer, &first, None);
        let twin = intent("test_2", "h.example.com", "/p").on_listener("test_1");
        composer.update_listener(&mut cache, &twin, None).unwrap();
        composer.update_listener(&mut cache, &twin, None).unwrap();

        let config = route_config(&cache, 0);
        assert_eq!(config.virtual_hosts.len(), 2);
        assert_eq!(config.virtual_hosts[1].routes.len(), 2);
        assert_eq!(cache.version(), 3);
    }

    #[test]
    fn test_merge_domains_policy_is_idempotent() {
        let composer = ListenerComposer::new(ComposerConfig::default().with_merge_policy(MergePolicy::MergeDomains));
        let mut cache = seeded(&composer, &intent("test_1", "h.example.com", "/one"), None);

        let other = intent("test_1", "h.example.com", "/two");
        composer.update_listener(&mut cache, &other, None).unwrap();
        composer.update_listener(&mut cache, &other, None).unwrap();

        let config = route_config(&cache, 0);
        assert_eq!(config.virtual_hosts.len(), 1);
        assert_eq!(config.virtual_hosts[0].routes.len(), 2);
        // second update added nothing and left the version alone
        assert_eq!(cache.version(), 2);

        let elsewhere = intent("test_1", "other.example.com", "/one");
        composer.update_listener(&mut cache, &elsewhere, None).unwrap();
        assert_eq!(route_config(&cache, 0).virtual_hosts.len(), 2);
    }

    #[test]
    fn test_merge_domains_folds_into_virtual_host_serving_domain() {
        let composer = ListenerComposer::new(ComposerConfig::default().with_merge_policy(MergePolicy::MergeDomains));
        let mut cache = seeded(&composer, &intent("test_1", "h.example.com", "/one"), None);

        let other = intent("test_2", "h.example.com", "/two").on_listener("test_1");
        composer.update_listener(&mut cache, &other, None).unwrap();

        let config = route_config(&cache, 0);
        assert_eq!(config.virtual_hosts.len(), 1);
        assert_eq!(config.virtual_hosts[0].name, "test_1_service_h.example.com");
        let clusters: Vec<&str> = config.virtual_hosts[0]
            .routes
            .iter()
            .map(|r| match &r.action {
                Some(Action::Route(action)) => action.cluster(),
                _ => "",
            })
            .collect();
        assert_eq!(clusters, vec!["test_1", "test_2"]);
        assert_eq!(cache.version(), 2);

        composer.update_listener(&mut cache, &other, None).unwrap();
        assert_eq!(route_count(&route_config(&cache, 0)), 2);
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn test_challenge_skips_service_named_after_virtual_host_prefix() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("foo", "foo.example.com", "/"), None);
        let nested = intent("foo_service", "other.example.com", "/").on_listener("foo");
        composer.update_listener(&mut cache, &nested, None).unwrap();

        composer
            .update_listener_with_challenge(&mut cache, &ChallengeParams::new("foo", "TOK", "BODY"))
            .unwrap();

        let config = route_config(&cache, 0);
        let foo = config
            .virtual_hosts
            .iter()
            .find(|vh| vh.name == "foo_service_foo.example.com")
            .unwrap();
        assert_eq!(foo.routes.len(), 2);
        assert_eq!(foo.routes[0].r#match.as_ref().unwrap().get_path(), "/.well-known/acme-challenge/TOK");

        let nested = config
            .virtual_hosts
            .iter()
            .find(|vh| vh.name == "foo_service_service_other.example.com")
            .unwrap();
        assert_eq!(nested.routes.len(), 1);
        assert_eq!(nested.routes[0].r#match.as_ref().unwrap().get_path(), "");
    }

    fn jwt_auth(provider: &str) -> Auth {
        Auth::jwt(
            provider,
            format!("https://{}.example.com/", provider),
            format!("https://{}.example.com/.well-known/jwks.json", provider),
        )
    }

    fn filter_names(listener: &Listener) -> Vec<String> {
        listener_http_connection_manager(listener)
            .unwrap()
            .http_filters
            .into_iter()
            .map(|f| f.name)
            .collect()
    }

    #[test]
    fn test_create_listener_with_auth_filters() {
        let auth = jwt_auth("auth0").forwarded().with_authz_cluster("authz");
        let listener = composer().create_listener(&intent("svc", "a.example.com", "/api").with_auth(auth), None);

        assert_eq!(filter_names(&listener), vec![names::JWT_AUTHN, names::EXT_AUTHZ, names::ROUTER]);

        let jwt = listener_jwt_authentication(&listener).unwrap().unwrap();
        let provider = &jwt.providers["auth0"];
        assert_eq!(provider.issuer, "https://auth0.example.com/");
        assert!(provider.forward);
        let uri = provider.remote_jwks().unwrap().http_uri.as_ref().unwrap();
        assert_eq!(uri.uri, "https://auth0.example.com/.well-known/jwks.json");
        assert_eq!(uri.cluster(), "auth0");

        assert_eq!(jwt.rules.len(), 1);
        assert_eq!(jwt.rules[0].provider_name(), "auth0");
        assert_eq!(jwt.rules[0].r#match.as_ref().unwrap().get_prefix(), "/api");

        let authz = listener_ext_authz(&listener).unwrap().unwrap();
        assert_eq!(authz.grpc_service().unwrap().cluster_name(), "authz");
    }

    #[test]
    fn test_create_listener_without_auth_has_router_only() {
        let listener = composer().create_listener(&intent("svc", "a.example.com", "/"), None);
        assert_eq!(filter_names(&listener), vec![names::ROUTER]);
        assert!(listener_jwt_authentication(&listener).unwrap().is_none());
        assert!(listener_ext_authz(&listener).unwrap().is_none());
    }

    #[test]
    fn test_upsert_http_filter_keeps_router_last() {
        let mut filters = vec![HttpFilter::typed(names::ROUTER, codec::encode(&Router {}))];
        let first = codec::encode(&ExtAuthz::grpc("one", AUTH_UPSTREAM_TIMEOUT));
        let second = codec::encode(&ExtAuthz::grpc("two", AUTH_UPSTREAM_TIMEOUT));

        assert!(upsert_http_filter(&mut filters, names::EXT_AUTHZ, first.clone()));
        assert!(upsert_http_filter(&mut filters, names::JWT_AUTHN, codec::encode(&JwtAuthentication::default())));
        let order: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec![names::EXT_AUTHZ, names::JWT_AUTHN, names::ROUTER]);

        assert!(!upsert_http_filter(&mut filters, names::EXT_AUTHZ, first));
        assert!(upsert_http_filter(&mut filters, names::EXT_AUTHZ, second.clone()));
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].typed_config(), Some(&second));
        assert_eq!(filters[2].name, names::ROUTER);

        let mut bare = Vec::new();
        assert!(upsert_http_filter(&mut bare, names::EXT_AUTHZ, second));
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn test_update_merges_jwt_providers_and_rules() {
        let composer = ListenerComposer::new(ComposerConfig::default().with_merge_policy(MergePolicy::MergeDomains));
        let first = intent("svc", "a.example.com", "/one").with_auth(jwt_auth("p1"));
        let mut cache = seeded(&composer, &first, None);

        let second = intent("other", "b.example.com", "/two")
            .on_listener("svc")
            .with_auth(jwt_auth("p2"));
        composer.update_listener(&mut cache, &second, None).unwrap();
        assert_eq!(cache.version(), 2);

        let listener = &cache.listeners()[0];
        assert_eq!(filter_names(listener), vec![names::JWT_AUTHN, names::ROUTER]);
        let jwt = listener_jwt_authentication(listener).unwrap().unwrap();
        assert_eq!(jwt.providers.keys().map(String::as_str).collect::<Vec<_>>(), vec!["p1", "p2"]);
        let rules: Vec<(&str, &str)> = jwt
            .rules
            .iter()
            .map(|r| (r.provider_name(), r.r#match.as_ref().unwrap().get_prefix()))
            .collect();
        assert_eq!(rules, vec![("p1", "/one"), ("p2", "/two")]);

        composer.update_listener(&mut cache, &second, None).unwrap();
        assert_eq!(cache.version(), 2);
        assert_eq!(listener_jwt_authentication(&cache.listeners()[0]).unwrap().unwrap(), jwt);
    }

    #[test]
    fn test_update_auth_only_change_bumps_version() {
        let composer = ListenerComposer::new(ComposerConfig::default().with_merge_policy(MergePolicy::MergeDomains));
        let plain = intent("svc", "a.example.com", "/");
        let mut cache = seeded(&composer, &plain, None);

        let guarded = plain.clone().with_auth(Auth::default().with_authz_cluster("authz_v1"));
        composer.update_listener(&mut cache, &guarded, None).unwrap();
        assert_eq!(cache.version(), 2);
        assert_eq!(route_count(&route_config(&cache, 0)), 1);
        assert_eq!(filter_names(&cache.listeners()[0]), vec![names::EXT_AUTHZ, names::ROUTER]);

        let moved = plain.with_auth(Auth::default().with_authz_cluster("authz_v2"));
        composer.update_listener(&mut cache, &moved, None).unwrap();
        assert_eq!(cache.version(), 3);
        assert_eq!(filter_names(&cache.listeners()[0]), vec![names::EXT_AUTHZ, names::ROUTER]);
        let authz = listener_ext_authz(&cache.listeners()[0]).unwrap().unwrap();
        assert_eq!(authz.grpc_service().unwrap().cluster_name(), "authz_v2");
    }

    #[test]
    fn test_update_with_corrupt_jwt_filter_fails() {
        let composer = composer();
        let mut cache = seeded(&composer, &intent("svc", "a.example.com", "/").with_auth(jwt_auth("p1")), None);
        let listener = cache.get_mut(0).unwrap();
        let mut manager = listener_http_connection_manager(listener).unwrap();
        manager.http_filters[0].config_type =
            Some(http_filter::ConfigType::TypedConfig(codec::encode(&Router {})));
        write_http_connection_manager(listener, &manager).unwrap();
        let before = cache.listeners().to_vec();

        let err = composer
            .update_listener(&mut cache, &intent("svc", "a.example.com", "/b").with_auth(jwt_auth("p2")), None)
            .unwrap_err();
        assert!(matches!(err, XdsError::Codec(CodecError::TypeMismatch { .. })));
        assert_eq!(cache.listeners(), before.as_slice());
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn test_create_mutual_tls_listener() {
        let tls = TlsParams::new("svc", "certbundle", "privateKey")
            .with_client_ca("CA_BUNDLE", ["client.example.com"]);
        let listener = composer().create_listener(&intent("svc", "a.example.com", "/"), Some(&tls));

        let context = listener_tls_context(&listener).unwrap().unwrap();
        assert_eq!(context.require_client_certificate, Some(true));
        let validation = context.validation_context().unwrap();
        assert_eq!(validation.trusted_ca.as_ref().unwrap().as_inline_string(), Some("CA_BUNDLE"));
        assert_eq!(validation.match_typed_subject_alt_names.len(), 1);
        assert_eq!(
            validation.match_typed_subject_alt_names[0].matcher.as_ref().unwrap().get_exact(),
            "client.example.com"
        );

        let one_way = composer().create_listener(
            &intent("svc", "a.example.com", "/"),
            Some(&TlsParams::new("svc", "certbundle", "privateKey")),
        );
        let context = listener_tls_context(&one_way).unwrap().unwrap();
        assert!(context.validation_context().is_none());
        assert_eq!(context.require_client_certificate, None);
    }

    #[test]
    fn test_cert_rotation_adds_client_ca() {
        let composer = composer();
        let tls = TlsParams::new("foo", "OLD_CB", "OLD_PK");
        let mut cache = seeded(&composer, &ListenerIntent::new("foo", "foo.internal"), Some(&tls));

        let rotated = TlsParams::new("foo", "NEW_CB", "NEW_PK").with_client_ca("CA", Vec::<String>::new());
        composer.update_listener_with_new_cert(&mut cache, &rotated).unwrap();

        let context = listener_tls_context(&cache.listeners()[0]).unwrap().unwrap();
        let validation = context.validation_context().unwrap();
        assert_eq!(validation.trusted_ca.as_ref().unwrap().as_inline_string(), Some("CA"));
        assert!(validation.match_typed_subject_alt_names.is_empty());
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn test_update_with_rds_manager_fails() {
        let composer = composer();
        let mut cache = seeded(&composer, &ListenerIntent::new("svc", "svc.internal"), None);
        let listener = cache.get_mut(0).unwrap();
        let mut manager = listener_http_connection_manager(listener).unwrap();
        manager.route_specifier = Some(http_connection_manager::RouteSpecifier::Rds(Default::default()));
        write_http_connection_manager(listener, &manager).unwrap();

        let err = composer
            .update_listener(&mut cache, &ListenerIntent::new("svc", "svc.internal"), None)
            .unwrap_err();
        assert!(matches!(err, XdsError::NoRouteConfig(_)));
    }

    #[test]
    fn test_update_empty_route_config_fails() {
        let composer = composer();
        let mut cache = seeded(&composer, &ListenerIntent::new("svc", "svc.internal"), None);
        let listener = cache.get_mut(0).unwrap();
        let mut manager = listener_http_connection_manager(listener).unwrap();
        manager.route_config_mut().unwrap().virtual_hosts.clear();
        write_http_connection_manager(listener, &manager).unwrap();
        let before = cache.listeners().to_vec();

        let err = composer
            .update_listener(&mut cache, &ListenerIntent::new("svc", "svc.internal"), None)
            .unwrap_err();
        assert!(matches!(err, XdsError::NoVirtualHosts(_)));
        assert_eq!(cache.listeners(), before.as_slice());
    }

    #[test]
    fn test_update_propagates_decode_error() {
        let composer = composer();
        let mut cache = seeded(&composer, &ListenerIntent::new("svc", "svc.internal"), None);
        cache.get_mut(0).unwrap().filter_chains[0].filters[0].config_type =
            Some(filter::ConfigType::TypedConfig(codec::encode_tls_context(&DownstreamTlsContext::default())));

        let err = composer
            .update_listener(&mut cache, &ListenerIntent::new("svc", "svc.internal"), None)
            .unwrap_err();
        assert!(matches!(err, XdsError::Codec(CodecError::TypeMismatch { .. })));
    }

    #[test]
    fn test_operations_log_through_scoped_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let composer = composer();
            let mut cache = seeded(&composer, &intent("svc", "a.example.com", "/a"), None);
            composer
                .update_listener(&mut cache, &intent("svc", "a.example.com", "/b"), None)
                .unwrap();
            assert_eq!(cache.version(), 2);
        });
    }

    #[test]
    fn test_missing_filter_chain_and_filter() {
        let mut listener = Listener {
            name: "l_broken".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            listener_http_connection_manager(&listener),
            Err(XdsError::NoFilterChains(_))
        ));

        listener.filter_chains.push(FilterChain::default());
        assert!(matches!(
            listener_http_connection_manager(&listener),
            Err(XdsError::NoFilters(_))
        ));
    }
}
