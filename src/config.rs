//! Service configuration.
//!
//! Loaded from YAML; every field has a default so a partial file is enough.
//! The depth limit is not configurable; see [`crate::depth::MAX_DEPTH`].

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration file format this build understands.
pub const CONFIG_VERSION: &str = "1";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphQLServiceConfig {
    /// HTTP listener and request handling settings
    pub settings: SettingsConfig,
    /// Execution engine that accepted requests are forwarded to
    pub upstream: UpstreamConfig,
    /// Configuration version
    pub version: String,
}

impl Default for GraphQLServiceConfig {
    fn default() -> Self {
        Self {
            settings: SettingsConfig::default(),
            upstream: UpstreamConfig::default(),
            version: CONFIG_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Address the HTTP server binds to
    pub listen_address: String,
    /// Route serving GraphQL requests
    pub graphql_path: String,
    /// Largest request body accepted, in bytes
    pub max_body_size: usize,
    /// Report the measured depth in an `X-GraphQL-Depth` response header
    pub debug_headers: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8000".to_string(),
            graphql_path: "/graphql".to_string(),
            max_body_size: 1_048_576,
            debug_headers: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// GraphQL endpoint of the execution engine
    pub url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4000/graphql".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl GraphQLServiceConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ServiceError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.version != CONFIG_VERSION {
            return Err(ServiceError::Config(format!(
                "unsupported config version {:?} (expected {:?})",
                self.version, CONFIG_VERSION
            )));
        }

        self.settings.listen_addr()?;

        if !self.settings.graphql_path.starts_with('/') {
            return Err(ServiceError::Config(format!(
                "graphql_path must start with '/': {:?}",
                self.settings.graphql_path
            )));
        }
        if self.settings.max_body_size == 0 {
            return Err(ServiceError::Config(
                "max_body_size must be greater than zero".to_string(),
            ));
        }
        if self.upstream.url.trim().is_empty() {
            return Err(ServiceError::Config("upstream url is empty".to_string()));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(ServiceError::Config(
                "upstream timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl SettingsConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ServiceError> {
        self.listen_address.parse().map_err(|e| {
            ServiceError::Config(format!(
                "invalid listen_address {:?}: {}",
                self.listen_address, e
            ))
        })
    }
}
