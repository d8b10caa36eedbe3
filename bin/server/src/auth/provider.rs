//! Reddit OAuth2 client using the oauth2 crate.

use async_trait::async_trait;
use modlog_access::{AccessToken, IdentityProvider, OAuthConfig, ProviderError, StateToken};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use rootcause::prelude::Report;
use serde::Deserialize;
use tracing::{debug, instrument};

/// The fields of the identity endpoint response this client reads.
#[derive(Debug, Deserialize)]
struct Identity {
    name: String,
}

/// OAuth2 client for reddit's authorization-code flow.
///
/// Endpoint URLs are validated once at construction.
#[derive(Clone)]
pub struct RedditOAuthClient {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    identity_url: reqwest::Url,
    scope: String,
    http_client: reqwest::Client,
}

impl RedditOAuthClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &OAuthConfig) -> Result<Self, Report<ProviderError>> {
        let auth_url = AuthUrl::new(config.authorize_url().to_string()).map_err(|e| {
            ProviderError::Configuration {
                details: format!("invalid authorize URL: {}", e),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url().to_string()).map_err(|e| {
            ProviderError::Configuration {
                details: format!("invalid token URL: {}", e),
            }
        })?;
        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string()).map_err(|e| {
            ProviderError::Configuration {
                details: format!("invalid redirect URI: {}", e),
            }
        })?;
        let identity_url = reqwest::Url::parse(config.identity_url()).map_err(|e| {
            ProviderError::Configuration {
                details: format!("invalid identity URL: {}", e),
            }
        })?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| ProviderError::Configuration {
                details: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            auth_url,
            token_url,
            redirect_url,
            identity_url,
            scope: config.scope().to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProvider for RedditOAuthClient {
    fn authorization_request(&self) -> (String, StateToken) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(self.scope.clone()))
            // Reddit issues a one-hour token with no refresh token.
            .add_extra_param("duration", "temporary")
            .url();

        (
            auth_url.to_string(),
            StateToken::new(csrf_token.secret().clone()),
        )
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Report<ProviderError>> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| ProviderError::TokenExchange {
                details: e.to_string(),
            })?;

        debug!("exchanged authorization code");
        Ok(AccessToken::new(token_result.access_token().secret().clone()))
    }

    #[instrument(skip(self, access_token))]
    async fn fetch_username(
        &self,
        access_token: &AccessToken,
    ) -> Result<String, Report<ProviderError>> {
        let identity: Identity = self
            .http_client
            .get(self.identity_url.clone())
            .bearer_auth(access_token.secret())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ProviderError::IdentityFetch {
                details: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| ProviderError::IdentityFetch {
                details: format!("unexpected identity response: {}", e),
            })?;

        Ok(identity.name)
    }
}
