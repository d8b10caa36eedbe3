//! In-memory directory for tests.

use async_trait::async_trait;
use modlog_core::{CommunityId, UserId};
use rootcause::prelude::Report;

use crate::entitlement::{EntitlementResolver, Entitlements, ModeratedCommunity};
use crate::error::DirectoryError;

/// An [`EntitlementResolver`] over fixed rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: Vec<(UserId, String)>,
    communities: Vec<ModeratedCommunity>,
    moderators: Vec<(CommunityId, UserId)>,
    unavailable: bool,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user row.
    #[must_use]
    pub fn with_user(mut self, id: i64, username: &str) -> Self {
        self.users.push((UserId::new(id), username.to_string()));
        self
    }

    /// Adds a community row.
    #[must_use]
    pub fn with_community(mut self, id: i64, name: &str, subscribers: i64) -> Self {
        self.communities.push(ModeratedCommunity {
            id: CommunityId::new(id),
            name: name.to_string(),
            subscribers,
        });
        self
    }

    /// Adds a moderator relationship.
    #[must_use]
    pub fn with_moderator(mut self, community_id: i64, user_id: i64) -> Self {
        self.moderators
            .push((CommunityId::new(community_id), UserId::new(user_id)));
        self
    }

    /// Makes every lookup fail as if the store were unreachable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> Result<(), Report<DirectoryError>> {
        if self.unavailable {
            return Err(DirectoryError::QueryFailed {
                details: "directory offline".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn user_id(&self, username: &str) -> Option<UserId> {
        let wanted = username.to_uppercase();
        self.users
            .iter()
            .find(|(_, name)| name.to_uppercase() == wanted)
            .map(|(id, _)| *id)
    }
}

#[async_trait]
impl EntitlementResolver for InMemoryDirectory {
    async fn communities_moderated_by(
        &self,
        username: &str,
    ) -> Result<Entitlements, Report<DirectoryError>> {
        self.check_available()?;
        let Some(user_id) = self.user_id(username) else {
            return Ok(Entitlements::default());
        };

        let communities = self
            .communities
            .iter()
            .filter(|c| self.moderators.contains(&(c.id, user_id)))
            .cloned()
            .collect();

        Ok(Entitlements::new(communities))
    }

    async fn resolve_user_id(
        &self,
        username: &str,
    ) -> Result<Option<UserId>, Report<DirectoryError>> {
        self.check_available()?;
        Ok(self.user_id(username))
    }
}
