//! Anti-forgery state tracking for the OAuth redirect round trip.
//!
//! A state token is registered when an authorization URL is issued and must
//! be presented back on the callback before its expiry. Validation prunes
//! every entry that expired strictly before now, then looks the token up;
//! both steps happen under one lock (or one transaction) so a token cannot
//! be pruned and matched inconsistently by concurrent callbacks.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rootcause::prelude::Report;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StateStoreError;

/// Default lifetime of a state token.
pub const DEFAULT_STATE_TTL_SECONDS: i64 = 600;

/// An opaque anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateToken(String);

impl StateToken {
    /// Wraps a token value.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a successful validation consumes the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumePolicy {
    /// The token is deleted on its first successful validation.
    #[default]
    SingleUse,
    /// The token stays valid until it expires, so a captured callback URL
    /// can be replayed inside the expiry window.
    Reusable,
}

impl ConsumePolicy {
    /// Maps the `single_use` configuration flag to a policy.
    #[must_use]
    pub fn from_single_use(single_use: bool) -> Self {
        if single_use {
            Self::SingleUse
        } else {
            Self::Reusable
        }
    }
}

/// Storage for short-lived anti-forgery tokens.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stores `token` with an expiry of now plus the store's TTL.
    async fn register(&self, token: &StateToken) -> Result<(), Report<StateStoreError>>;

    /// Returns true iff a non-expired entry for `token` exists.
    ///
    /// Purges every entry that expired strictly before now as a side effect.
    async fn validate(&self, token: &str) -> Result<bool, Report<StateStoreError>>;
}

/// Process-local state store.
///
/// Suitable only when a single server process handles both the login and
/// callback requests.
#[derive(Debug)]
pub struct InMemoryStateStore {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
    policy: ConsumePolicy,
}

impl InMemoryStateStore {
    /// Creates a single-use store with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(
            Duration::seconds(DEFAULT_STATE_TTL_SECONDS),
            ConsumePolicy::SingleUse,
        )
    }

    /// Creates a store with an explicit TTL and consume policy.
    #[must_use]
    pub fn with_policy(ttl: Duration, policy: ConsumePolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            policy,
        }
    }

    /// Returns the number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if no entries are held.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn register(&self, token: &StateToken) -> Result<(), Report<StateStoreError>> {
        let expires_at = Utc::now() + self.ttl;
        self.entries
            .lock()
            .await
            .insert(token.as_str().to_string(), expires_at);
        Ok(())
    }

    async fn validate(&self, token: &str) -> Result<bool, Report<StateStoreError>> {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;

        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, "pruned expired state tokens");
        }

        let valid = match self.policy {
            ConsumePolicy::SingleUse => entries.remove(token).is_some(),
            ConsumePolicy::Reusable => entries.contains_key(token),
        };

        Ok(valid)
    }
}
