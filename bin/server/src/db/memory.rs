//! In-memory repositories for router tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use modlog_access::{Session, SessionId};
use modlog_core::{ActionId, CommunityId};
use modlog_query::{Column, ListingQuery, PAGE_SIZE};
use rootcause::prelude::Report;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{ActionEntry, ActionLogRepository, SessionRepository};
use crate::error::{ActionLogError, SessionError};

/// A stored action with the raw ids the listing restricts on.
#[derive(Debug, Clone)]
struct StoredAction {
    community: i64,
    moderator_id: Option<i64>,
    author_id: Option<i64>,
    entry: ActionEntry,
}

impl StoredAction {
    fn column(&self, column: Column) -> Option<i64> {
        match column {
            Column::Community => Some(self.community),
            Column::Moderator => self.moderator_id,
            Column::Author => self.author_id,
        }
    }

    fn matches(&self, query: &ListingQuery) -> bool {
        query
            .restrictions()
            .all(|(column, value)| self.column(column) == Some(value))
    }
}

/// Action log over a fixed set of rows.
#[derive(Default)]
pub struct InMemoryActionLog {
    actions: Vec<StoredAction>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` entries to `community`, one minute apart, newest last.
    pub fn with_entries(
        self,
        community: CommunityId,
        moderator: (i64, &str),
        count: usize,
    ) -> Self {
        self.push_entries(community, moderator, None, count)
    }

    /// Like [`Self::with_entries`], with every entry targeting content by
    /// `author`.
    pub fn with_authored_entries(
        self,
        community: CommunityId,
        moderator: (i64, &str),
        author: (i64, &str),
        count: usize,
    ) -> Self {
        self.push_entries(community, moderator, Some(author), count)
    }

    fn push_entries(
        mut self,
        community: CommunityId,
        moderator: (i64, &str),
        author: Option<(i64, &str)>,
        count: usize,
    ) -> Self {
        let start = DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000);
        for n in 0..count {
            let id = i64::try_from(self.actions.len()).unwrap_or(i64::MAX) + 1;
            self.actions.push(StoredAction {
                community: community.get(),
                moderator_id: Some(moderator.0),
                author_id: author.map(|(id, _)| id),
                entry: ActionEntry {
                    id: ActionId::new(id),
                    time: start + Duration::minutes(i64::try_from(n).unwrap_or_default()),
                    moderator: Some(moderator.1.to_string()),
                    target_type: "link".to_string(),
                    target_id: Some(id * 1000),
                    author: author.map(|(_, name)| name.to_string()),
                    action_summary: "removelink".to_string(),
                    action_details: None,
                },
            });
        }
        self
    }
}

#[async_trait]
impl ActionLogRepository for InMemoryActionLog {
    async fn count(&self, query: &ListingQuery) -> Result<u64, Report<ActionLogError>> {
        let matching = self.actions.iter().filter(|a| a.matches(query)).count();
        Ok(u64::try_from(matching).unwrap_or_default())
    }

    async fn list(&self, query: &ListingQuery) -> Result<Vec<ActionEntry>, Report<ActionLogError>> {
        let mut entries: Vec<ActionEntry> = self
            .actions
            .iter()
            .filter(|a| a.matches(query))
            .map(|a| a.entry.clone())
            .collect();
        entries.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| b.id.cmp(&a.id)));

        let offset = usize::try_from(query.page_number().offset()).unwrap_or_default();
        Ok(entries
            .into_iter()
            .skip(offset)
            .take(PAGE_SIZE as usize)
            .collect())
    }
}

/// Session storage in a map.
#[derive(Default)]
pub struct InMemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessions {
    async fn create(&self, session: &Session) -> Result<(), Report<SessionError>> {
        self.sessions
            .lock()
            .await
            .insert(session.id().as_str().to_string(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, Report<SessionError>> {
        Ok(self.sessions.lock().await.get(id.as_str()).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), Report<SessionError>> {
        self.sessions.lock().await.remove(id.as_str());
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, Report<SessionError>> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        Ok(u64::try_from(before - sessions.len()).unwrap_or_default())
    }
}
