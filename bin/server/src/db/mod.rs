//! Database repositories.
//!
//! The users, communities, moderator, and action tables are owned by the
//! archiver that fills them; this server only reads them. The session and
//! OAuth state tables are created by this crate's migrations.

pub mod action_log;
pub mod directory;
#[cfg(test)]
pub mod memory;
pub mod session;
pub mod state;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modlog_access::{Session, SessionId};
use modlog_core::ActionId;
use modlog_query::ListingQuery;
use rootcause::prelude::Report;
use serde::Serialize;

use crate::error::{ActionLogError, SessionError};

pub use action_log::PgActionLog;
pub use directory::PgDirectory;
pub use session::{PgSessionRepository, generate_session_id};
pub use state::PgStateStore;

/// One action log row, with user ids resolved to usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionEntry {
    pub id: ActionId,
    pub time: DateTime<Utc>,
    /// Acting moderator, if the user row still exists.
    pub moderator: Option<String>,
    pub target_type: String,
    pub target_id: Option<i64>,
    /// Author of the targeted content, if any.
    pub author: Option<String>,
    pub action_summary: String,
    pub action_details: Option<String>,
}

/// Read access to the action log.
#[async_trait]
pub trait ActionLogRepository: Send + Sync {
    /// Counts every entry matching the query's restrictions.
    async fn count(&self, query: &ListingQuery) -> Result<u64, Report<ActionLogError>>;

    /// Fetches the query's page, newest first.
    async fn list(&self, query: &ListingQuery) -> Result<Vec<ActionEntry>, Report<ActionLogError>>;
}

/// Storage for login sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<(), Report<SessionError>>;

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionError>>;

    /// Deletes a session. Deleting a missing session is not an error.
    async fn delete(&self, id: &SessionId) -> Result<(), Report<SessionError>>;

    /// Deletes expired sessions, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, Report<SessionError>>;
}
