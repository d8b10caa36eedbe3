//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OAuthConfig`](modlog_access::OAuthConfig) for identity provider
//! configuration.

use modlog_access::{ConsumePolicy, DEFAULT_STATE_TTL_SECONDS, OAuthConfig};
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Upper bound on pooled database connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Anti-forgery state configuration.
    #[serde(default)]
    pub state: StateConfig,

    /// OAuth2 identity provider configuration.
    pub oauth: OAuthConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_duration_minutes() -> i64 {
    480
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

/// Anti-forgery state configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Lifetime of an issued state token, in seconds.
    #[serde(default = "default_state_ttl_seconds")]
    pub ttl_seconds: i64,

    /// Whether a state token is consumed by its first successful callback.
    #[serde(default = "default_single_use")]
    pub single_use: bool,
}

fn default_state_ttl_seconds() -> i64 {
    DEFAULT_STATE_TTL_SECONDS
}

fn default_single_use() -> bool {
    true
}

impl StateConfig {
    /// Returns the token lifetime.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds)
    }

    /// Returns the consume policy selected by `single_use`.
    #[must_use]
    pub fn policy(&self) -> ConsumePolicy {
        ConsumePolicy::from_single_use(self.single_use)
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_state_ttl_seconds(),
            single_use: default_single_use(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
