//! Error types for the access crate.
//!
//! Errors fall into two groups:
//! - Report contexts raised at I/O boundaries (`StateStoreError`,
//!   `ProviderError`, `DirectoryError`), wrapped in `rootcause::Report`.
//! - Decision outcomes (`LoginError`, `AuthorizationError`, `LookupError`)
//!   that the web layer matches on to pick a response.

use std::fmt;

/// Failures of the anti-forgery state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateStoreError {
    /// The backing store could not be reached or rejected the operation.
    Unavailable { details: String },
}

impl fmt::Display for StateStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => write!(f, "state store unavailable: {details}"),
        }
    }
}

impl std::error::Error for StateStoreError {}

/// Failures talking to the OAuth identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The client could not be configured (bad endpoint URL and similar).
    Configuration { details: String },
    /// Exchanging the authorization code for an access token failed.
    TokenExchange { details: String },
    /// Fetching the authenticated identity failed.
    IdentityFetch { details: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { details } => {
                write!(f, "identity provider configuration error: {details}")
            }
            Self::TokenExchange { details } => write!(f, "token exchange failed: {details}"),
            Self::IdentityFetch { details } => write!(f, "identity fetch failed: {details}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Failures reading users, communities, and moderator relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The query could not be executed.
    QueryFailed { details: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryFailed { details } => write!(f, "directory query failed: {details}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Why the OAuth callback did not produce an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The provider redirected back with an `error` parameter.
    ProviderDenied { reason: String },
    /// The `state` parameter is missing, unknown, expired, or already used.
    InvalidState,
    /// The state store could not be consulted.
    StateStoreUnavailable { details: String },
    /// The callback carried no authorization code.
    MissingCode,
    /// The code could not be exchanged for an access token.
    TokenExchangeFailed { details: String },
    /// The access token could not be resolved to a username.
    IdentityFetchFailed { details: String },
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderDenied { reason } => write!(f, "provider denied login: {reason}"),
            Self::InvalidState => write!(f, "invalid or expired state parameter"),
            Self::StateStoreUnavailable { details } => {
                write!(f, "state store unavailable: {details}")
            }
            Self::MissingCode => write!(f, "callback is missing the authorization code"),
            Self::TokenExchangeFailed { details } => {
                write!(f, "token exchange failed: {details}")
            }
            Self::IdentityFetchFailed { details } => {
                write!(f, "identity fetch failed: {details}")
            }
        }
    }
}

impl std::error::Error for LoginError {}

/// Why a request may not see a community's action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No session identity.
    NotAuthenticated,
    /// The user moderates no communities at all.
    NoModeratedCommunities { username: String },
    /// The user does not moderate the requested community.
    CommunityNotModerated { username: String, community: String },
    /// Entitlements could not be resolved.
    CheckFailed { reason: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "user is not authenticated"),
            Self::NoModeratedCommunities { username } => {
                write!(f, "user {username} moderates no communities")
            }
            Self::CommunityNotModerated {
                username,
                community,
            } => {
                write!(f, "user {username} does not moderate {community}")
            }
            Self::CheckFailed { reason } => write!(f, "authorization check failed: {reason}"),
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Why a username or community name could not be resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No row matches the name.
    NotFound { entity: &'static str, name: String },
    /// The directory could not be queried.
    Unavailable { details: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, name } => write!(f, "{entity} '{name}' not found"),
            Self::Unavailable { details } => write!(f, "directory unavailable: {details}"),
        }
    }
}

impl std::error::Error for LookupError {}
