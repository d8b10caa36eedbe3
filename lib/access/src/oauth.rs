//! OAuth2 identity provider configuration.
//!
//! The provider is reddit by default; every endpoint can be overridden so the
//! client can be pointed at a staging provider or a test double.

use serde::{Deserialize, Serialize};

/// Configuration for the OAuth2 identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the OAuth2 callback (e.g., "https://modlog.example.com/authorize").
    redirect_uri: String,
    /// Authorization endpoint the user is sent to.
    #[serde(default = "default_authorize_url")]
    authorize_url: String,
    /// Token endpoint for the code exchange.
    #[serde(default = "default_token_url")]
    token_url: String,
    /// Endpoint returning the authenticated account.
    #[serde(default = "default_identity_url")]
    identity_url: String,
    /// Scope to request. Default: "identity"
    #[serde(default = "default_scope")]
    scope: String,
    /// User-Agent sent on every provider request.
    #[serde(default = "default_user_agent")]
    user_agent: String,
    /// Timeout for each provider request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

fn default_authorize_url() -> String {
    "https://ssl.reddit.com/api/v1/authorize".to_string()
}

fn default_token_url() -> String {
    "https://ssl.reddit.com/api/v1/access_token".to_string()
}

fn default_identity_url() -> String {
    "https://oauth.reddit.com/api/v1/me".to_string()
}

fn default_scope() -> String {
    "identity".to_string()
}

fn default_user_agent() -> String {
    concat!("modlog-viewer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl OAuthConfig {
    /// Creates a new configuration with defaults for optional fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        OAuthConfigBuilder::new(client_id, client_secret, redirect_uri).build()
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> OAuthConfigBuilder {
        OAuthConfigBuilder::new(client_id, client_secret, redirect_uri)
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the authorization endpoint.
    #[must_use]
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the identity endpoint.
    #[must_use]
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// Returns the requested scope.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the User-Agent header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

/// Builder for `OAuthConfig`.
#[derive(Debug)]
pub struct OAuthConfigBuilder {
    config: OAuthConfig,
}

impl OAuthConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            config: OAuthConfig {
                client_id,
                client_secret,
                redirect_uri,
                authorize_url: default_authorize_url(),
                token_url: default_token_url(),
                identity_url: default_identity_url(),
                scope: default_scope(),
                user_agent: default_user_agent(),
                timeout_seconds: default_timeout_seconds(),
            },
        }
    }

    /// Points every provider endpoint at `base_url`, keeping reddit's paths.
    #[must_use]
    pub fn base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.config.authorize_url = format!("{base}/api/v1/authorize");
        self.config.token_url = format!("{base}/api/v1/access_token");
        self.config.identity_url = format!("{base}/api/v1/me");
        self
    }

    /// Sets the authorization endpoint.
    #[must_use]
    pub fn authorize_url(mut self, url: String) -> Self {
        self.config.authorize_url = url;
        self
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn token_url(mut self, url: String) -> Self {
        self.config.token_url = url;
        self
    }

    /// Sets the identity endpoint.
    #[must_use]
    pub fn identity_url(mut self, url: String) -> Self {
        self.config.identity_url = url;
        self
    }

    /// Sets the requested scope.
    #[must_use]
    pub fn scope(mut self, scope: String) -> Self {
        self.config.scope = scope;
        self
    }

    /// Sets the User-Agent header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Sets the per-request timeout in seconds.
    #[must_use]
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = seconds;
        self
    }

    /// Builds the `OAuthConfig`.
    #[must_use]
    pub fn build(self) -> OAuthConfig {
        self.config
    }
}
