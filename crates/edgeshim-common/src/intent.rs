//! Route intents
//!
//! Declarative inputs submitted by callers. An intent names a backend
//! service, the request conditions it should receive traffic for and,
//! optionally, the TLS material used to terminate connections.

use serde::{Deserialize, Serialize};

/// A request to expose a backend service on the edge listeners
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerIntent {
    /// Service name; also the upstream cluster name routes forward to
    pub name: String,

    /// Listener group this intent attaches to (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<String>,

    /// Downstream protocol as submitted (`http`, `https`)
    #[serde(default)]
    pub protocol: String,

    /// Host header written on forwarded requests
    #[serde(default)]
    pub target_hostname: String,

    /// Request conditions
    #[serde(default)]
    pub conditions: Conditions,

    /// Request authentication and authorization
    #[serde(default)]
    pub auth: Auth,
}

impl ListenerIntent {
    /// Create an intent forwarding everything to `name`
    pub fn new(name: impl Into<String>, target_hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocol: "http".to_string(),
            target_hostname: target_hostname.into(),
            ..Default::default()
        }
    }

    /// Match on the given Host/authority
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.conditions.hostname = hostname.into();
        self
    }

    /// Match on a path prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.conditions.prefix = prefix.into();
        self
    }

    /// Match on an exact path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.conditions.path = path.into();
        self
    }

    /// Match on a path regex
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.conditions.regex = regex.into();
        self
    }

    /// Restrict to the given HTTP methods
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Require authentication on this intent's routes
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Attach to the listener of another service
    pub fn on_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Name of the listener group, falling back to the service name
    pub fn listener_group(&self) -> &str {
        match self.listener.as_deref() {
            Some(group) if !group.is_empty() => group,
            _ => &self.name,
        }
    }
}

/// Request conditions of an intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    /// Host to match; empty matches any host
    pub hostname: String,
    /// Path prefix; empty or `/` matches everything
    pub prefix: String,
    /// Exact path, takes precedence over `prefix`
    pub path: String,
    /// Path regex, takes precedence over `path` and `prefix`
    pub regex: String,
    /// Allowed HTTP methods; empty allows all
    pub methods: Vec<String>,
}

/// JWT validation and external authorization of an intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Auth {
    /// JWT provider name; empty disables JWT validation
    pub jwt_provider: String,
    /// Expected `iss` claim
    pub issuer: String,
    /// Forward the validated token upstream
    pub forward: bool,
    /// URI of the JWKS document
    pub remote_jwks: String,
    /// Cluster serving the JWKS document (defaults to the provider name)
    pub jwks_cluster: String,
    /// gRPC cluster of the external authorization service; empty disables it
    pub authz_cluster: String,
}

impl Auth {
    /// JWT validation against a remote JWKS
    pub fn jwt(
        provider: impl Into<String>,
        issuer: impl Into<String>,
        remote_jwks: impl Into<String>,
    ) -> Self {
        Self {
            jwt_provider: provider.into(),
            issuer: issuer.into(),
            remote_jwks: remote_jwks.into(),
            ..Default::default()
        }
    }

    /// Forward the validated token upstream
    pub fn forwarded(mut self) -> Self {
        self.forward = true;
        self
    }

    /// Call out to an external authorization service
    pub fn with_authz_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.authz_cluster = cluster.into();
        self
    }

    /// Whether JWT validation is configured
    pub fn has_jwt(&self) -> bool {
        !self.jwt_provider.is_empty()
    }

    /// Whether external authorization is configured
    pub fn has_authz(&self) -> bool {
        !self.authz_cluster.is_empty()
    }

    /// Cluster the JWKS document is fetched through
    pub fn jwks_cluster(&self) -> &str {
        if self.jwks_cluster.is_empty() {
            &self.jwt_provider
        } else {
            &self.jwks_cluster
        }
    }
}

/// TLS material for a listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsParams {
    /// Service name the certificate belongs to
    pub name: String,
    /// PEM certificate chain
    pub cert_bundle: String,
    /// PEM private key
    pub private_key: String,
    /// PEM CA bundle client certificates are verified against; empty
    /// disables client certificate validation
    #[serde(default)]
    pub ca_certificate: String,
    /// Subject alt names a client certificate must carry one of
    #[serde(default)]
    pub allowed_subject_alt_names: Vec<String>,
}

impl TlsParams {
    /// Create TLS params for a service
    pub fn new(
        name: impl Into<String>,
        cert_bundle: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cert_bundle: cert_bundle.into(),
            private_key: private_key.into(),
            ..Default::default()
        }
    }

    /// Require client certificates issued by `ca_certificate`
    pub fn with_client_ca<I, S>(mut self, ca_certificate: impl Into<String>, subject_alt_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ca_certificate = ca_certificate.into();
        self.allowed_subject_alt_names = subject_alt_names.into_iter().map(Into::into).collect();
        self
    }

    /// TLS is in effect only when a certificate bundle is present
    pub fn is_enabled(&self) -> bool {
        !self.cert_bundle.is_empty()
    }

    /// Whether client certificates are verified (mutual TLS)
    pub fn is_mutual(&self) -> bool {
        self.is_enabled() && !self.ca_certificate.is_empty()
    }
}

/// ACME HTTP-01 challenge to serve from the plaintext listener
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeParams {
    /// Service name whose listener serves the challenge
    pub name: String,
    /// Domain under validation
    pub domain: String,
    /// Challenge URI at the ACME server
    pub uri: String,
    /// Challenge token
    pub token: String,
    /// Key authorization served as the response body
    pub body: String,
    /// Authorization URI at the ACME server
    #[serde(rename = "authzURI")]
    pub authz_uri: String,
}

impl ChallengeParams {
    /// Create a challenge for a service
    pub fn new(
        name: impl Into<String>,
        token: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Path the challenge is served on
    pub fn path(&self) -> String {
        format!("/.well-known/acme-challenge/{}", self.token)
    }
}
