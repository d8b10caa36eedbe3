//! Session extractor for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use modlog_access::SessionId;
use std::sync::Arc;

use super::AppState;
use crate::error::AppError;

/// Session cookie name.
pub(crate) const SESSION_COOKIE: &str = "session";

/// The username bound to the request's session, if any.
///
/// A missing, unknown, or expired session yields `None`; expired sessions
/// are deleted when they are presented.
pub struct SessionIdentity(pub Option<String>);

impl<S> FromRequestParts<S> for SessionIdentity
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Internal {
                details: "failed to read cookies".to_string(),
            })?;

        let Some(session_cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(SessionIdentity(None));
        };

        let session_id = SessionId::new(session_cookie.value().to_string());

        let session = app_state
            .sessions
            .find_by_id(&session_id)
            .await
            .map_err(|e| AppError::Unavailable {
                details: e.to_string(),
            })?;

        let Some(session) = session else {
            return Ok(SessionIdentity(None));
        };

        if session.is_expired() {
            if let Err(e) = app_state.sessions.delete(&session_id).await {
                tracing::warn!(error = %e, "failed to delete expired session");
            }
            return Ok(SessionIdentity(None));
        }

        Ok(SessionIdentity(Some(session.username().to_string())))
    }
}
