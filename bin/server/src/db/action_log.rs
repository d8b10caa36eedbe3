//! Postgres-backed action log reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modlog_core::ActionId;
use modlog_query::ListingQuery;
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use super::{ActionEntry, ActionLogRepository};
use crate::error::ActionLogError;

/// Row type for listing queries.
#[derive(FromRow)]
struct ActionRow {
    id: i64,
    time: DateTime<Utc>,
    moderator: Option<String>,
    target_type: String,
    target_id: Option<i64>,
    author: Option<String>,
    action_summary: String,
    action_details: Option<String>,
}

impl From<ActionRow> for ActionEntry {
    fn from(row: ActionRow) -> Self {
        Self {
            id: ActionId::new(row.id),
            time: row.time,
            moderator: row.moderator,
            target_type: row.target_type,
            target_id: row.target_id,
            author: row.author,
            action_summary: row.action_summary,
            action_details: row.action_details,
        }
    }
}

/// Action log repository over the archiver's `actions` table.
pub struct PgActionLog {
    pool: PgPool,
}

impl PgActionLog {
    /// Creates a new action log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionLogRepository for PgActionLog {
    #[instrument(skip(self), fields(community = %query.community()))]
    async fn count(&self, query: &ListingQuery) -> Result<u64, Report<ActionLogError>> {
        let statements = query.build();

        let mut count = sqlx::query_scalar::<_, i64>(&statements.count_sql);
        for param in &statements.params {
            count = count.bind(*param);
        }

        let total = count
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ActionLogError::DatabaseError {
                details: e.to_string(),
            })?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    #[instrument(skip(self), fields(community = %query.community(), page = %query.page_number()))]
    async fn list(&self, query: &ListingQuery) -> Result<Vec<ActionEntry>, Report<ActionLogError>> {
        let statements = query.build();

        let mut listing = sqlx::query_as::<_, ActionRow>(&statements.listing_sql);
        for param in &statements.params {
            listing = listing.bind(*param);
        }

        let rows = listing
            .bind(statements.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ActionLogError::DatabaseError {
                details: e.to_string(),
            })?;

        Ok(rows.into_iter().map(ActionEntry::from).collect())
    }
}
