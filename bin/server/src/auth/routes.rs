//! Authentication routes for login, callback, and logout.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use modlog_access::{CallbackParams, Session, SessionId, begin_login, complete_login};
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{AppState, middleware::SESSION_COOKIE};
use crate::db::generate_session_id;
use crate::error::AppError;

/// Renders the login page with a link to the provider.
pub async fn login(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let (auth_url, _) = begin_login(
        state.identity_provider.as_ref(),
        state.state_store.as_ref(),
    )
    .await
    .map_err(|e| AppError::Unavailable {
        details: e.to_string(),
    })?;

    Ok(Html(format!(
        "Log in via <a href=\"{}\">reddit</a>.",
        auth_url.replace('&', "&amp;")
    )))
}

/// Handles the provider's redirect back after the user authorizes.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let username = complete_login(
        state.identity_provider.as_ref(),
        state.state_store.as_ref(),
        &params,
    )
    .await?;

    let session_id = generate_session_id();
    let session_duration = state.session_config.duration_minutes;
    let session = Session::new(
        session_id.clone(),
        username,
        ChronoDuration::minutes(session_duration),
    );

    state
        .sessions
        .create(&session)
        .await
        .map_err(|e| AppError::Unavailable {
            details: e.to_string(),
        })?;

    let session_cookie = Cookie::build((SESSION_COOKIE, session_id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(session_duration));

    Ok((jar.add(session_cookie), Redirect::to("/")))
}

/// Logs out the user by deleting their session.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let session_id = SessionId::new(session_cookie.value().to_string());

        if let Err(e) = state.sessions.delete(&session_id).await {
            tracing::warn!(error = %e, "failed to delete session on logout");
        }
    }

    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), Redirect::to("/"))
}
