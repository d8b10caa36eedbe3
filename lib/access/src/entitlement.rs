//! Moderator entitlements.
//!
//! A user is entitled to a community's action log exactly when a moderator
//! relationship links them. The set is ordered by subscriber count so the
//! largest community is a sensible default view.

use async_trait::async_trait;
use modlog_core::{CommunityId, UserId};
use rootcause::prelude::Report;
use serde::Serialize;

use crate::error::{DirectoryError, LookupError};

/// A community the user moderates, with its ranking signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeratedCommunity {
    /// Community id.
    pub id: CommunityId,
    /// Display name, in its stored casing.
    pub name: String,
    /// Subscriber count, used only for ordering.
    pub subscribers: i64,
}

/// The ordered set of communities a user moderates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitlements {
    communities: Vec<ModeratedCommunity>,
}

/// Outcome of checking a request against an entitlement set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementCheck<'a> {
    /// The request may proceed against this community.
    Allowed(&'a ModeratedCommunity),
    /// The user moderates nothing.
    NoCommunities,
    /// The requested community is not in the set.
    NotModerated,
}

impl Entitlements {
    /// Builds the set, ordering by subscribers descending then name.
    ///
    /// Duplicate names (compared case-insensitively) keep their first entry.
    #[must_use]
    pub fn new(mut communities: Vec<ModeratedCommunity>) -> Self {
        communities.sort_by(|a, b| {
            b.subscribers
                .cmp(&a.subscribers)
                .then_with(|| a.name.cmp(&b.name))
        });
        let mut seen = std::collections::HashSet::new();
        communities.retain(|c| seen.insert(c.name.to_uppercase()));
        Self { communities }
    }

    /// Returns true if the user moderates nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Returns the number of moderated communities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// Returns the communities, largest first.
    #[must_use]
    pub fn communities(&self) -> &[ModeratedCommunity] {
        &self.communities
    }

    /// Returns the community names, largest first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.communities.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the community with the most subscribers.
    #[must_use]
    pub fn default_community(&self) -> Option<&ModeratedCommunity> {
        self.communities.first()
    }

    /// Finds a community by display name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModeratedCommunity> {
        let wanted = name.to_uppercase();
        self.communities
            .iter()
            .find(|c| c.name.to_uppercase() == wanted)
    }

    /// Checks a request for `requested`, or for the default community when
    /// none was named.
    #[must_use]
    pub fn check(&self, requested: Option<&str>) -> EntitlementCheck<'_> {
        if self.is_empty() {
            return EntitlementCheck::NoCommunities;
        }

        let community = match requested {
            Some(name) => self.find(name),
            None => self.default_community(),
        };

        match community {
            Some(community) => EntitlementCheck::Allowed(community),
            None => EntitlementCheck::NotModerated,
        }
    }
}

/// Read access to users, communities, and moderator relationships.
#[async_trait]
pub trait EntitlementResolver: Send + Sync {
    /// Returns the communities `username` moderates. Username matching
    /// ignores case. An unknown user moderates nothing.
    async fn communities_moderated_by(
        &self,
        username: &str,
    ) -> Result<Entitlements, Report<DirectoryError>>;

    /// Looks up a user id by username, ignoring case.
    async fn resolve_user_id(&self, username: &str)
    -> Result<Option<UserId>, Report<DirectoryError>>;
}

/// Resolves a username to an id, failing with `NotFound` if nobody has it.
pub async fn require_user_id(
    resolver: &dyn EntitlementResolver,
    username: &str,
) -> Result<UserId, LookupError> {
    resolver
        .resolve_user_id(username)
        .await
        .map_err(|report| LookupError::Unavailable {
            details: report.to_string(),
        })?
        .ok_or_else(|| LookupError::NotFound {
            entity: "user",
            name: username.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDirectory;

    fn community(id: i64, name: &str, subscribers: i64) -> ModeratedCommunity {
        ModeratedCommunity {
            id: CommunityId::new(id),
            name: name.to_string(),
            subscribers,
        }
    }

    #[test]
    fn orders_by_subscribers_descending() {
        let entitlements = Entitlements::new(vec![
            community(1, "alpha", 10),
            community(2, "beta", 500),
            community(3, "gamma", 50),
        ]);

        assert_eq!(entitlements.names(), vec!["beta", "gamma", "alpha"]);
        assert_eq!(
            entitlements.default_community().map(|c| c.name.as_str()),
            Some("beta")
        );
    }

    #[test]
    fn ties_break_by_name() {
        let entitlements =
            Entitlements::new(vec![community(1, "zeta", 10), community(2, "eta", 10)]);
        assert_eq!(entitlements.names(), vec!["eta", "zeta"]);
    }

    #[test]
    fn find_ignores_case() {
        let entitlements = Entitlements::new(vec![community(1, "AskScience", 10)]);
        let found = entitlements.find("askscience").expect("found");
        assert_eq!(found.name, "AskScience");
    }

    #[test]
    fn empty_set_is_never_allowed() {
        let entitlements = Entitlements::default();
        assert_eq!(entitlements.check(None), EntitlementCheck::NoCommunities);
        assert_eq!(
            entitlements.check(Some("alpha")),
            EntitlementCheck::NoCommunities
        );
    }

    #[test]
    fn unlisted_community_is_not_moderated() {
        let entitlements = Entitlements::new(vec![community(1, "alpha", 10)]);
        assert_eq!(
            entitlements.check(Some("gamma")),
            EntitlementCheck::NotModerated
        );
    }

    #[test]
    fn no_request_selects_default() {
        let entitlements =
            Entitlements::new(vec![community(1, "alpha", 10), community(2, "beta", 20)]);
        match entitlements.check(None) {
            EntitlementCheck::Allowed(c) => assert_eq!(c.name, "beta"),
            other => panic!("expected allowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn require_user_id_reports_missing_user() {
        let directory = InMemoryDirectory::new().with_user(1, "bob");

        assert_eq!(
            require_user_id(&directory, "BOB").await,
            Ok(UserId::new(1))
        );
        assert_eq!(
            require_user_id(&directory, "carol").await,
            Err(LookupError::NotFound {
                entity: "user",
                name: "carol".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn require_user_id_reports_unavailable_directory() {
        let directory = InMemoryDirectory::new().with_user(1, "bob").unavailable();

        assert!(matches!(
            require_user_id(&directory, "bob").await,
            Err(LookupError::Unavailable { .. })
        ));
    }
}
