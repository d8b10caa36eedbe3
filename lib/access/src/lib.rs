//! Authentication and access control for the modlog viewer.
//!
//! This crate provides:
//! - OAuth2 provider configuration (`OAuthConfig`)
//! - Anti-forgery state tracking (`StateStore`, `InMemoryStateStore`)
//! - The identity provider seam (`IdentityProvider`, `begin_login`)
//! - Moderator entitlements (`EntitlementResolver`, `Entitlements`)
//! - Session records (`Session`, `SessionId`)
//! - The per-request authorization state machine (`authorizer`)
//!
//! # Access Control Model
//!
//! A user may view the action log of a community if and only if they
//! moderate it. Every request re-derives its state from the session and the
//! directory; nothing about entitlement is cached in the session itself.
//!
//! # Example
//!
//! ```
//! use modlog_access::{StateStore, InMemoryStateStore, StateToken};
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
//! # runtime.block_on(async {
//! let store = InMemoryStateStore::new();
//! let token = StateToken::new("3b1f0c".to_string());
//!
//! store.register(&token).await.expect("register");
//! assert!(store.validate("3b1f0c").await.expect("validate"));
//! // Tokens are single-use by default.
//! assert!(!store.validate("3b1f0c").await.expect("validate"));
//! # });
//! ```

pub mod authorizer;
pub mod entitlement;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod oauth;
pub mod provider;
pub mod session;
pub mod state;

// Re-export main types at crate root
pub use authorizer::{
    CallbackParams, ListingGrant, RequestState, authorize_listing, complete_login,
};
pub use entitlement::{
    EntitlementCheck, EntitlementResolver, Entitlements, ModeratedCommunity, require_user_id,
};
pub use error::{
    AuthorizationError, DirectoryError, LoginError, LookupError, ProviderError, StateStoreError,
};
pub use oauth::{OAuthConfig, OAuthConfigBuilder};
pub use provider::{AccessToken, IdentityProvider, begin_login};
pub use session::{Session, SessionId};
pub use state::{ConsumePolicy, DEFAULT_STATE_TTL_SECONDS, InMemoryStateStore, StateStore, StateToken};
