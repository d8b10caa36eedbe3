//! Postgres-backed session storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modlog_access::{Session, SessionId};
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use super::SessionRepository;
use crate::error::SessionError;

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    username: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session::with_timestamps(
            SessionId::new(row.id),
            row.username,
            row.created_at,
            row.expires_at,
        )
    }
}

/// Repository for session operations.
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> SessionError {
    SessionError::DatabaseError {
        details: e.to_string(),
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self, session), fields(username = %session.username()))]
    async fn create(&self, session: &Session) -> Result<(), Report<SessionError>> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, username, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session.id().as_str())
        .bind(session.username())
        .bind(session.created_at())
        .bind(session.expires_at())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self, id))]
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionError>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, username, created_at, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Session::from))
    }

    #[instrument(skip(self, id))]
    async fn delete(&self, id: &SessionId) -> Result<(), Report<SessionError>> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self) -> Result<u64, Report<SessionError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}

/// Generates a unique session ID using ULID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(ulid::Ulid::new().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_ulids() {
        let first = generate_session_id();
        let second = generate_session_id();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 26);
        assert!(first.as_str().parse::<ulid::Ulid>().is_ok());
    }
}
