//! Postgres-backed anti-forgery state store.
//!
//! Shared by every server process, so a login started on one instance can
//! complete on another.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use modlog_access::{ConsumePolicy, StateStore, StateStoreError, StateToken};
use rootcause::prelude::Report;
use sqlx::PgPool;
use tracing::{debug, instrument};

/// State store over the `oauth_states` table.
pub struct PgStateStore {
    pool: PgPool,
    ttl: Duration,
    policy: ConsumePolicy,
}

impl PgStateStore {
    /// Creates a new state store.
    pub fn new(pool: PgPool, ttl: Duration, policy: ConsumePolicy) -> Self {
        Self { pool, ttl, policy }
    }
}

fn unavailable(e: sqlx::Error) -> StateStoreError {
    StateStoreError::Unavailable {
        details: e.to_string(),
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    #[instrument(skip(self, token))]
    async fn register(&self, token: &StateToken) -> Result<(), Report<StateStoreError>> {
        let created_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO oauth_states (state, created_at, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (state) DO UPDATE SET created_at = $2, expires_at = $3
            "#,
        )
        .bind(token.as_str())
        .bind(created_at)
        .bind(created_at + self.ttl)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    #[instrument(skip(self, token), fields(policy = ?self.policy))]
    async fn validate(&self, token: &str) -> Result<bool, Report<StateStoreError>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let pruned = sqlx::query("DELETE FROM oauth_states WHERE expires_at < $1")
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?
            .rows_affected();
        if pruned > 0 {
            debug!(pruned, "pruned expired state tokens");
        }

        let found: Option<String> = match self.policy {
            ConsumePolicy::SingleUse => {
                sqlx::query_scalar("DELETE FROM oauth_states WHERE state = $1 RETURNING state")
                    .bind(token)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(unavailable)?
            }
            ConsumePolicy::Reusable => {
                sqlx::query_scalar("SELECT state FROM oauth_states WHERE state = $1")
                    .bind(token)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(unavailable)?
            }
        };

        tx.commit().await.map_err(unavailable)?;

        Ok(found.is_some())
    }
}
