//! The OAuth2 identity provider seam.

use async_trait::async_trait;
use rootcause::prelude::Report;
use tracing::debug;

use crate::error::{ProviderError, StateStoreError};
use crate::state::{StateStore, StateToken};

/// A provider access token.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token value.
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    /// Returns the token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// An OAuth2 authorization-code provider that can name the logged-in account.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds an authorization URL around a freshly generated random state.
    ///
    /// The state is not registered anywhere; use [`begin_login`] for that.
    fn authorization_request(&self) -> (String, StateToken);

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Report<ProviderError>>;

    /// Returns the username the access token belongs to.
    ///
    /// Casing is whatever the provider reports.
    async fn fetch_username(
        &self,
        access_token: &AccessToken,
    ) -> Result<String, Report<ProviderError>>;
}

/// Issues an authorization URL and registers its state token.
pub async fn begin_login(
    provider: &dyn IdentityProvider,
    store: &dyn StateStore,
) -> Result<(String, StateToken), Report<StateStoreError>> {
    let (url, state) = provider.authorization_request();
    store.register(&state).await?;
    debug!("registered login state");
    Ok((url, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStateStore;

    struct FixedProvider;

    #[async_trait]
    impl IdentityProvider for FixedProvider {
        fn authorization_request(&self) -> (String, StateToken) {
            (
                "https://provider.example/authorize?state=fixed".to_string(),
                StateToken::new("fixed".to_string()),
            )
        }

        async fn exchange_code(&self, _code: &str) -> Result<AccessToken, Report<ProviderError>> {
            Ok(AccessToken::new("token".to_string()))
        }

        async fn fetch_username(
            &self,
            _access_token: &AccessToken,
        ) -> Result<String, Report<ProviderError>> {
            Ok("alice".to_string())
        }
    }

    #[tokio::test]
    async fn begin_login_registers_the_state() {
        let store = InMemoryStateStore::new();

        let (url, state) = begin_login(&FixedProvider, &store).await.expect("login");

        assert!(url.contains("state=fixed"));
        assert!(store.validate(state.as_str()).await.expect("validate"));
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret".to_string());
        assert!(!format!("{token:?}").contains("super-secret"));
        assert_eq!(token.secret(), "super-secret");
    }
}
