//! Action log listings.
//!
//! Every listing handler authorizes the request against the session user's
//! entitlements first. The page segment is parsed, filter usernames are
//! resolved, and the action log is queried only once a grant for the
//! community has been issued.

use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use modlog_access::{authorize_listing, require_user_id};
use modlog_query::{ListingQuery, PageNumber, Pagination, Restriction};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{AppState, SessionIdentity};
use crate::db::ActionEntry;
use crate::error::AppError;

/// Which user a listing is narrowed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "username", rename_all = "lowercase")]
pub enum ListingFilter {
    /// Entries performed by this moderator.
    #[serde(rename = "mod")]
    Moderator(String),
    /// Entries targeting content by this author.
    Author(String),
}

/// A listing route, used to build page links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRoute {
    community: String,
    filter: Option<ListingFilter>,
}

impl ListingRoute {
    pub fn new(community: &str, filter: Option<ListingFilter>) -> Self {
        Self {
            community: community.to_string(),
            filter,
        }
    }

    /// Path of the first page, without a page segment.
    ///
    /// Names are inserted verbatim. Reddit community and user names are
    /// limited to ASCII letters, digits, `_` and `-`, so they need no escaping.
    pub fn base(&self) -> String {
        match &self.filter {
            None => format!("/r/{}/", self.community),
            Some(ListingFilter::Moderator(username)) => {
                format!("/r/{}/mod/{}/", self.community, username)
            }
            Some(ListingFilter::Author(username)) => {
                format!("/r/{}/author/{}/", self.community, username)
            }
        }
    }

    /// Path of `page`.
    pub fn page(&self, page: PageNumber) -> String {
        format!("{}page/{}/", self.base(), page)
    }
}

/// One rendered action log row.
#[derive(Debug, Clone, Serialize)]
pub struct ListingRow {
    #[serde(flatten)]
    pub entry: ActionEntry,
    /// `target_id` as reddit renders ids in URLs.
    pub target_id_base36: Option<String>,
}

impl From<ActionEntry> for ListingRow {
    fn from(entry: ActionEntry) -> Self {
        let target_id_base36 = entry.target_id.map(to_base36);
        Self {
            entry,
            target_id_base36,
        }
    }
}

/// One page of a community's action log.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub username: String,
    /// Every community the user moderates, largest first.
    pub communities: Vec<String>,
    pub community: String,
    pub filter: Option<ListingFilter>,
    pub page: PageNumber,
    pub num_pages: u64,
    pub total_rows: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub rows: Vec<ListingRow>,
}

/// Formats a non-negative id in lowercase base 36.
pub fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// `/` and `/biggest`: the user's largest community.
pub async fn index(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
) -> Result<Redirect, AppError> {
    let grant = authorize_listing(identity, None, state.directory.as_ref()).await?;
    Ok(Redirect::to(
        &ListingRoute::new(&grant.community().name, None).base(),
    ))
}

pub async fn by_community(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path(community): Path<String>,
) -> Result<Json<ListingPage>, AppError> {
    render_listing(&state, identity, &community, None, None).await
}

pub async fn by_community_page(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path((community, page)): Path<(String, String)>,
) -> Result<Json<ListingPage>, AppError> {
    render_listing(&state, identity, &community, None, Some(page.as_str())).await
}

pub async fn by_moderator(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path((community, username)): Path<(String, String)>,
) -> Result<Json<ListingPage>, AppError> {
    let filter = ListingFilter::Moderator(username);
    render_listing(&state, identity, &community, Some(filter), None).await
}

pub async fn by_moderator_page(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path((community, username, page)): Path<(String, String, String)>,
) -> Result<Json<ListingPage>, AppError> {
    let filter = ListingFilter::Moderator(username);
    render_listing(&state, identity, &community, Some(filter), Some(page.as_str())).await
}

pub async fn by_author(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path((community, username)): Path<(String, String)>,
) -> Result<Json<ListingPage>, AppError> {
    let filter = ListingFilter::Author(username);
    render_listing(&state, identity, &community, Some(filter), None).await
}

pub async fn by_author_page(
    State(state): State<Arc<AppState>>,
    SessionIdentity(identity): SessionIdentity,
    Path((community, username, page)): Path<(String, String, String)>,
) -> Result<Json<ListingPage>, AppError> {
    let filter = ListingFilter::Author(username);
    render_listing(&state, identity, &community, Some(filter), Some(page.as_str())).await
}

async fn render_listing(
    state: &AppState,
    identity: Option<String>,
    community: &str,
    filter: Option<ListingFilter>,
    page: Option<&str>,
) -> Result<Json<ListingPage>, AppError> {
    let grant = authorize_listing(identity, Some(community), state.directory.as_ref()).await?;

    let page = match page {
        Some(raw) => raw.parse::<PageNumber>().map_err(|e| AppError::NotFound {
            what: e.to_string(),
        })?,
        None => PageNumber::FIRST,
    };

    let mut query = ListingQuery::new(grant.community().id).page(page);
    match &filter {
        Some(ListingFilter::Moderator(username)) => {
            let id = require_user_id(state.directory.as_ref(), username).await?;
            query = query.restrict(Restriction::Moderator(id));
        }
        Some(ListingFilter::Author(username)) => {
            let id = require_user_id(state.directory.as_ref(), username).await?;
            query = query.restrict(Restriction::Author(id));
        }
        None => {}
    }

    let total_rows = state
        .action_log
        .count(&query)
        .await
        .map_err(|e| AppError::Unavailable {
            details: e.to_string(),
        })?;
    let entries = state
        .action_log
        .list(&query)
        .await
        .map_err(|e| AppError::Unavailable {
            details: e.to_string(),
        })?;

    let pagination = Pagination::new(page, total_rows);
    let route = ListingRoute::new(&grant.community().name, filter.clone());

    tracing::debug!(
        username = %grant.username(),
        community = %grant.community().name,
        page = %page,
        total_rows,
        "rendering listing"
    );

    Ok(Json(ListingPage {
        username: grant.username().to_string(),
        communities: grant.entitlements().names(),
        community: grant.community().name.clone(),
        filter,
        page,
        num_pages: pagination.num_pages(),
        total_rows,
        prev_url: pagination.previous().map(|p| route.page(p)),
        next_url: pagination.next().map(|p| route.page(p)),
        rows: entries.into_iter().map(ListingRow::from).collect(),
    }))
}
