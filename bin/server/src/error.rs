//! Domain error types for server operations.
//!
//! Repository errors are report contexts. [`AppError`] is what handlers
//! return; it maps every failure to a status code and a generic message and
//! logs the details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use modlog_access::{AuthorizationError, LoginError, LookupError};
use std::fmt;

/// Session storage errors.
#[derive(Debug)]
pub enum SessionError {
    /// Database error while accessing sessions.
    DatabaseError { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError { details } => {
                write!(f, "session database error: {}", details)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Action log errors.
#[derive(Debug)]
pub enum ActionLogError {
    /// Database error while reading the action log.
    DatabaseError { details: String },
}

impl fmt::Display for ActionLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError { details } => {
                write!(f, "action log database error: {}", details)
            }
        }
    }
}

impl std::error::Error for ActionLogError {}

/// A request failure, rendered as an HTTP response.
#[derive(Debug)]
pub enum AppError {
    /// No session; the user is sent to the login page.
    NotAuthenticated,
    /// The user may not see what they asked for.
    Forbidden { reason: String },
    /// A named user, community, or page does not exist.
    NotFound { what: String },
    /// The request is malformed.
    BadRequest { message: &'static str },
    /// The provider redirected back with an error.
    ProviderDenied { reason: String },
    /// The identity provider failed.
    Upstream { details: String },
    /// A backing store could not be reached.
    Unavailable { details: String },
    /// Anything else.
    Internal { details: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::Forbidden { reason } => write!(f, "forbidden: {reason}"),
            Self::NotFound { what } => write!(f, "not found: {what}"),
            Self::BadRequest { message } => write!(f, "bad request: {message}"),
            Self::ProviderDenied { reason } => write!(f, "provider error: {reason}"),
            Self::Upstream { details } => write!(f, "upstream failure: {details}"),
            Self::Unavailable { details } => write!(f, "unavailable: {details}"),
            Self::Internal { details } => write!(f, "internal error: {details}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => Redirect::to("/login").into_response(),
            Self::Forbidden { reason } => {
                tracing::warn!(reason = %reason, "request forbidden");
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            Self::NotFound { what } => {
                tracing::debug!(what = %what, "not found");
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::ProviderDenied { reason } => {
                (StatusCode::BAD_REQUEST, format!("Error: {reason}")).into_response()
            }
            Self::Upstream { details } => {
                tracing::error!(details = %details, "identity provider failure");
                (StatusCode::BAD_GATEWAY, "Authentication failed").into_response()
            }
            Self::Unavailable { details } => {
                tracing::error!(details = %details, "backing store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable").into_response()
            }
            Self::Internal { details } => {
                tracing::error!(details = %details, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<LoginError> for AppError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::ProviderDenied { reason } => Self::ProviderDenied { reason },
            LoginError::InvalidState => Self::Forbidden {
                reason: error.to_string(),
            },
            LoginError::StateStoreUnavailable { details } => Self::Unavailable { details },
            LoginError::MissingCode => Self::BadRequest {
                message: "Missing authorization code",
            },
            LoginError::TokenExchangeFailed { details }
            | LoginError::IdentityFetchFailed { details } => Self::Upstream { details },
        }
    }
}

impl From<AuthorizationError> for AppError {
    fn from(error: AuthorizationError) -> Self {
        match error {
            AuthorizationError::NotAuthenticated => Self::NotAuthenticated,
            AuthorizationError::NoModeratedCommunities { .. }
            | AuthorizationError::CommunityNotModerated { .. } => Self::Forbidden {
                reason: error.to_string(),
            },
            AuthorizationError::CheckFailed { reason } => Self::Unavailable { details: reason },
        }
    }
}

impl From<LookupError> for AppError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::NotFound { .. } => Self::NotFound {
                what: error.to_string(),
            },
            LookupError::Unavailable { details } => Self::Unavailable { details },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_is_forbidden() {
        let response = AppError::from(LoginError::InvalidState).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_code_is_bad_request() {
        let response = AppError::from(LoginError::MissingCode).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_failures_are_bad_gateway() {
        let response = AppError::from(LoginError::TokenExchangeFailed {
            details: "timeout".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unavailable_state_store_is_service_unavailable() {
        let response = AppError::from(LoginError::StateStoreUnavailable {
            details: "connection refused".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_authenticated_redirects_to_login() {
        let response = AppError::from(AuthorizationError::NotAuthenticated).into_response();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get("location").map(|v| v.as_bytes()),
            Some(&b"/login"[..])
        );
    }

    #[test]
    fn unmoderated_community_is_forbidden() {
        let response = AppError::from(AuthorizationError::CommunityNotModerated {
            username: "alice".to_string(),
            community: "gamma".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_user_is_not_found() {
        let response = AppError::from(LookupError::NotFound {
            entity: "user",
            name: "Bob".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
