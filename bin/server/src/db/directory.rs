//! Users, communities, and moderator relationships.

use async_trait::async_trait;
use modlog_access::{DirectoryError, EntitlementResolver, Entitlements, ModeratedCommunity};
use modlog_core::{CommunityId, UserId};
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

/// Row type for moderated community queries.
#[derive(FromRow)]
struct CommunityRow {
    id: i64,
    display_name: String,
    subscribers: i64,
}

impl From<CommunityRow> for ModeratedCommunity {
    fn from(row: CommunityRow) -> Self {
        Self {
            id: CommunityId::new(row.id),
            name: row.display_name,
            subscribers: row.subscribers,
        }
    }
}

/// Entitlement resolver over the archiver's tables.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Creates a new directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_failed(e: sqlx::Error) -> DirectoryError {
    DirectoryError::QueryFailed {
        details: e.to_string(),
    }
}

#[async_trait]
impl EntitlementResolver for PgDirectory {
    #[instrument(skip(self))]
    async fn communities_moderated_by(
        &self,
        username: &str,
    ) -> Result<Entitlements, Report<DirectoryError>> {
        let rows: Vec<CommunityRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.display_name, s.subscribers
            FROM subreddits s
            JOIN subreddit_moderator sm ON (s.id = sm.subreddit_id)
            JOIN users u ON (u.id = sm.moderator_id)
            WHERE upper(u.username) = upper($1)
            ORDER BY s.subscribers DESC, s.display_name ASC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(Entitlements::new(
            rows.into_iter().map(ModeratedCommunity::from).collect(),
        ))
    }

    #[instrument(skip(self))]
    async fn resolve_user_id(
        &self,
        username: &str,
    ) -> Result<Option<UserId>, Report<DirectoryError>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE upper(username) = upper($1) LIMIT 1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

        Ok(id.map(UserId::new))
    }
}
