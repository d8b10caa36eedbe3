//! Authentication module for the modlog server.
//!
//! This module provides:
//! - The reddit OAuth2 client
//! - Database-backed session management
//! - The session identity extractor for Axum routes
//!
//! # Authorization Model
//!
//! A session records only who logged in. Which communities that user may see
//! is re-derived from the moderator tables on every request, so a removed
//! moderator loses access immediately rather than at session expiry.

pub mod middleware;
pub mod provider;
pub mod routes;

use crate::config::SessionConfig;
use crate::db::{ActionLogRepository, SessionRepository};
use modlog_access::{EntitlementResolver, IdentityProvider, StateStore};
use std::sync::Arc;

pub use middleware::SessionIdentity;
pub use provider::RedditOAuthClient;
pub use routes::{authorize, login, logout};

/// Shared application state.
pub struct AppState {
    /// OAuth2 identity provider.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Anti-forgery state for the login round trip.
    pub state_store: Arc<dyn StateStore>,
    /// Users, communities, and moderator relationships.
    pub directory: Arc<dyn EntitlementResolver>,
    /// The moderation action log.
    pub action_log: Arc<dyn ActionLogRepository>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionRepository>,
    /// Session configuration.
    pub session_config: SessionConfig,
}
