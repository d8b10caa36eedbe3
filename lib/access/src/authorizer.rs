//! Per-request authorization.
//!
//! Two entry points drive the state machine:
//!
//! - [`complete_login`] handles the OAuth callback and moves a request from
//!   `Authenticating` to `Authenticated` by producing a username.
//! - [`authorize_listing`] takes the session identity of an ordinary request
//!   and checks it against the user's entitlements, producing a
//!   [`ListingGrant`] naming the one community the request may read.
//!
//! Nothing here touches the action log. Callers resolve filter usernames and
//! query the log only after a grant has been issued.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::entitlement::{EntitlementCheck, EntitlementResolver, Entitlements, ModeratedCommunity};
use crate::error::{AuthorizationError, LoginError};
use crate::provider::IdentityProvider;
use crate::state::StateStore;

/// Where a request stands before entitlement is considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    /// No session identity.
    Unauthenticated,
    /// A session identity is present.
    Authenticated { username: String },
}

impl RequestState {
    /// Derives the state from an optional session identity.
    #[must_use]
    pub fn from_identity(identity: Option<String>) -> Self {
        match identity {
            Some(username) => Self::Authenticated { username },
            None => Self::Unauthenticated,
        }
    }
}

/// Query parameters the provider sends to the callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub error: Option<String>,
    pub state: Option<String>,
    pub code: Option<String>,
}

/// Completes an OAuth callback, returning the authenticated username.
///
/// The state is validated before the code is looked at, so a forged callback
/// never reaches the provider. A non-empty provider `error` short-circuits
/// everything and leaves the state store untouched.
pub async fn complete_login(
    provider: &dyn IdentityProvider,
    store: &dyn StateStore,
    params: &CallbackParams,
) -> Result<String, LoginError> {
    if let Some(reason) = params.error.as_deref().filter(|e| !e.is_empty()) {
        info!(reason = %reason, "provider denied login");
        return Err(LoginError::ProviderDenied {
            reason: reason.to_string(),
        });
    }

    let state = params.state.as_deref().ok_or(LoginError::InvalidState)?;
    let valid = store
        .validate(state)
        .await
        .map_err(|report| LoginError::StateStoreUnavailable {
            details: report.to_string(),
        })?;
    if !valid {
        warn!("callback presented an unknown or expired state");
        return Err(LoginError::InvalidState);
    }

    let code = params.code.as_deref().ok_or(LoginError::MissingCode)?;

    let token = provider
        .exchange_code(code)
        .await
        .map_err(|report| LoginError::TokenExchangeFailed {
            details: report.to_string(),
        })?;

    let username = provider
        .fetch_username(&token)
        .await
        .map_err(|report| LoginError::IdentityFetchFailed {
            details: report.to_string(),
        })?;

    info!(username = %username, "login completed");
    Ok(username)
}

/// Permission to read one community's action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingGrant {
    username: String,
    entitlements: Entitlements,
    community: ModeratedCommunity,
}

impl ListingGrant {
    /// Returns the authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns every community the user moderates, largest first.
    #[must_use]
    pub fn entitlements(&self) -> &Entitlements {
        &self.entitlements
    }

    /// Returns the granted community, with its canonical name.
    #[must_use]
    pub fn community(&self) -> &ModeratedCommunity {
        &self.community
    }
}

/// Authorizes a listing request.
///
/// `requested` names the community in the URL; `None` targets the user's
/// largest community. Forbidden outcomes never reveal whether the requested
/// community exists.
pub async fn authorize_listing(
    identity: Option<String>,
    requested: Option<&str>,
    resolver: &dyn EntitlementResolver,
) -> Result<ListingGrant, AuthorizationError> {
    let username = match RequestState::from_identity(identity) {
        RequestState::Unauthenticated => return Err(AuthorizationError::NotAuthenticated),
        RequestState::Authenticated { username } => username,
    };

    let entitlements = resolver
        .communities_moderated_by(&username)
        .await
        .map_err(|report| AuthorizationError::CheckFailed {
            reason: report.to_string(),
        })?;

    let community = match entitlements.check(requested) {
        EntitlementCheck::Allowed(community) => community.clone(),
        EntitlementCheck::NoCommunities => {
            return Err(AuthorizationError::NoModeratedCommunities { username });
        }
        EntitlementCheck::NotModerated => {
            return Err(AuthorizationError::CommunityNotModerated {
                username,
                community: requested.unwrap_or_default().to_string(),
            });
        }
    };

    debug!(username = %username, community = %community.name, "listing authorized");
    Ok(ListingGrant {
        username,
        entitlements,
        community,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::memory::InMemoryDirectory;
    use crate::provider::AccessToken;
    use crate::state::{InMemoryStateStore, StateToken};
    use async_trait::async_trait;
    use rootcause::prelude::Report;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        exchanges: AtomicUsize,
        fail_identity: bool,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        fn authorization_request(&self) -> (String, StateToken) {
            (
                "https://provider.example/authorize".to_string(),
                StateToken::new("issued".to_string()),
            )
        }

        async fn exchange_code(&self, code: &str) -> Result<AccessToken, Report<ProviderError>> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("token-for-{code}")))
        }

        async fn fetch_username(
            &self,
            _access_token: &AccessToken,
        ) -> Result<String, Report<ProviderError>> {
            if self.fail_identity {
                return Err(ProviderError::IdentityFetch {
                    details: "401 Unauthorized".to_string(),
                }
                .into());
            }
            Ok("Alice".to_string())
        }
    }

    async fn store_with(token: &str) -> InMemoryStateStore {
        let store = InMemoryStateStore::new();
        store
            .register(&StateToken::new(token.to_string()))
            .await
            .expect("register");
        store
    }

    fn params(error: Option<&str>, state: Option<&str>, code: Option<&str>) -> CallbackParams {
        CallbackParams {
            error: error.map(str::to_string),
            state: state.map(str::to_string),
            code: code.map(str::to_string),
        }
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_user(1, "alice")
            .with_user(2, "bob")
            .with_community(10, "alpha", 100)
            .with_community(20, "beta", 5000)
            .with_community(30, "gamma", 50)
            .with_moderator(10, 1)
            .with_moderator(20, 1)
    }

    #[tokio::test]
    async fn valid_callback_returns_username() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let username = complete_login(&provider, &store, &params(None, Some("good"), Some("c0de")))
            .await
            .expect("login");

        assert_eq!(username, "Alice");
    }

    #[tokio::test]
    async fn unknown_state_is_rejected_without_exchange() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let result = complete_login(
            &provider,
            &store,
            &params(None, Some("unknown-token"), Some("c0de")),
        )
        .await;

        assert_eq!(result, Err(LoginError::InvalidState));
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_state_is_rejected() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let result = complete_login(&provider, &store, &params(None, None, Some("c0de"))).await;

        assert_eq!(result, Err(LoginError::InvalidState));
    }

    #[tokio::test]
    async fn replayed_callback_is_rejected() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;
        let callback = params(None, Some("good"), Some("c0de"));

        complete_login(&provider, &store, &callback)
            .await
            .expect("first login");
        let replay = complete_login(&provider, &store, &callback).await;

        assert_eq!(replay, Err(LoginError::InvalidState));
    }

    #[tokio::test]
    async fn provider_error_short_circuits_and_keeps_state() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let result = complete_login(
            &provider,
            &store,
            &params(Some("access_denied"), Some("good"), None),
        )
        .await;

        assert_eq!(
            result,
            Err(LoginError::ProviderDenied {
                reason: "access_denied".to_string()
            })
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn empty_error_parameter_is_ignored() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let username = complete_login(&provider, &store, &params(Some(""), Some("good"), Some("c0de")))
            .await
            .expect("login");

        assert_eq!(username, "Alice");
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_code_after_valid_state() {
        let provider = CountingProvider::default();
        let store = store_with("good").await;

        let result = complete_login(&provider, &store, &params(None, Some("good"), None)).await;

        assert_eq!(result, Err(LoginError::MissingCode));
    }

    #[tokio::test]
    async fn identity_failure_is_reported() {
        let provider = CountingProvider {
            fail_identity: true,
            ..Default::default()
        };
        let store = store_with("good").await;

        let result = complete_login(&provider, &store, &params(None, Some("good"), Some("c0de"))).await;

        assert!(matches!(result, Err(LoginError::IdentityFetchFailed { .. })));
    }

    #[tokio::test]
    async fn anonymous_listing_is_not_authenticated() {
        let result = authorize_listing(None, Some("alpha"), &directory()).await;
        assert_eq!(result, Err(AuthorizationError::NotAuthenticated));
    }

    #[tokio::test]
    async fn default_listing_targets_largest_community() {
        let grant = authorize_listing(Some("alice".to_string()), None, &directory())
            .await
            .expect("grant");

        assert_eq!(grant.community().name, "beta");
        assert_eq!(grant.entitlements().names(), vec!["beta", "alpha"]);
    }

    #[tokio::test]
    async fn requested_community_is_matched_case_insensitively() {
        let grant = authorize_listing(Some("ALICE".to_string()), Some("Alpha"), &directory())
            .await
            .expect("grant");

        assert_eq!(grant.username(), "ALICE");
        assert_eq!(grant.community().name, "alpha");
    }

    #[tokio::test]
    async fn unmoderated_community_is_forbidden() {
        let result = authorize_listing(Some("alice".to_string()), Some("gamma"), &directory()).await;

        assert_eq!(
            result,
            Err(AuthorizationError::CommunityNotModerated {
                username: "alice".to_string(),
                community: "gamma".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn nonexistent_community_looks_like_unmoderated() {
        let result =
            authorize_listing(Some("alice".to_string()), Some("no-such-place"), &directory()).await;

        assert!(matches!(
            result,
            Err(AuthorizationError::CommunityNotModerated { .. })
        ));
    }

    #[tokio::test]
    async fn user_without_communities_is_forbidden() {
        let result = authorize_listing(Some("bob".to_string()), None, &directory()).await;

        assert_eq!(
            result,
            Err(AuthorizationError::NoModeratedCommunities {
                username: "bob".to_string()
            })
        );
    }

    #[tokio::test]
    async fn unavailable_directory_fails_the_check() {
        let result =
            authorize_listing(Some("alice".to_string()), None, &directory().unavailable()).await;

        assert!(matches!(result, Err(AuthorizationError::CheckFailed { .. })));
    }

    #[test]
    fn request_state_from_identity() {
        assert_eq!(RequestState::from_identity(None), RequestState::Unauthenticated);
        assert_eq!(
            RequestState::from_identity(Some("alice".to_string())),
            RequestState::Authenticated {
                username: "alice".to_string()
            }
        );
    }
}
