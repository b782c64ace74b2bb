//! Composer configuration
//!
//! Listener defaults and the virtual-host merge policy, loadable from YAML.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bind address for generated listeners
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
/// Default plaintext listener port
pub const DEFAULT_HTTP_PORT: u32 = 10000;
/// Default TLS listener port
pub const DEFAULT_HTTPS_PORT: u32 = 10001;
/// Default HTTP connection manager stat prefix
pub const DEFAULT_STAT_PREFIX: &str = "ingress_http";

/// How `update_listener` folds a new intent into an existing route config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Append a new virtual host per intent; duplicate domains coexist
    #[default]
    Append,
    /// Fold the route into the virtual host already serving the domain,
    /// skipping routes that are structurally present
    MergeDomains,
}

/// Listener composition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Address every listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port of plaintext listeners
    #[serde(default = "default_http_port")]
    pub http_port: u32,

    /// Port of TLS listeners
    #[serde(default = "default_https_port")]
    pub https_port: u32,

    /// Stat prefix of the HTTP connection manager
    #[serde(default = "default_stat_prefix")]
    pub stat_prefix: String,

    /// Virtual host merge policy
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_http_port() -> u32 {
    DEFAULT_HTTP_PORT
}

fn default_https_port() -> u32 {
    DEFAULT_HTTPS_PORT
}

fn default_stat_prefix() -> String {
    DEFAULT_STAT_PREFIX.to_string()
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
            stat_prefix: default_stat_prefix(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl ComposerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Set the merge policy
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Listener port for the given TLS flag
    pub fn port_for(&self, tls: bool) -> u32 {
        if tls {
            self.https_port
        } else {
            self.http_port
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Invalid("bind_address is required".to_string()));
        }
        for (field, port) in [("http_port", self.http_port), ("https_port", self.https_port)] {
            if port == 0 || port > u32::from(u16::MAX) {
                return Err(ConfigError::Invalid(format!(
                    "{} out of range: {}",
                    field, port
                )));
            }
        }
        if self.http_port == self.https_port {
            return Err(ConfigError::Invalid(format!(
                "http_port and https_port must differ (both {})",
                self.http_port
            )));
        }
        if self.stat_prefix.is_empty() {
            return Err(ConfigError::Invalid("stat_prefix is required".to_string()));
        }
        Ok(())
    }
}
