//! Router test fixtures.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use chrono::Duration;
use modlog_access::memory::InMemoryDirectory;
use modlog_access::{
    AccessToken, IdentityProvider, InMemoryStateStore, ProviderError, Session, SessionId,
    StateToken,
};
use modlog_core::CommunityId;
use rootcause::prelude::Report;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

use crate::app::router;
use crate::auth::AppState;
use crate::config::SessionConfig;
use crate::db::SessionRepository;
use crate::db::memory::{InMemoryActionLog, InMemorySessions};

/// Issues predictable states and always logs in as one user.
pub struct StubProvider {
    issued: AtomicUsize,
    username: String,
}

impl StubProvider {
    pub fn new(username: &str) -> Self {
        Self {
            issued: AtomicUsize::new(0),
            username: username.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorization_request(&self) -> (String, StateToken) {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let state = format!("issued-{n}");
        (
            format!("https://provider.example/authorize?state={state}&duration=temporary"),
            StateToken::new(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Report<ProviderError>> {
        Ok(AccessToken::new(format!("token-for-{code}")))
    }

    async fn fetch_username(
        &self,
        _access_token: &AccessToken,
    ) -> Result<String, Report<ProviderError>> {
        Ok(self.username.clone())
    }
}

/// Alice moderates alpha and the larger beta; carol moderates nothing.
pub fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_user(1, "alice")
        .with_user(3, "carol")
        .with_community(10, "alpha", 100)
        .with_community(20, "beta", 5000)
        .with_community(30, "gamma", 50)
        .with_moderator(10, 1)
        .with_moderator(20, 1)
}

/// Sixty entries in alpha, three in beta, four in gamma.
pub fn action_log() -> InMemoryActionLog {
    InMemoryActionLog::new()
        .with_entries(CommunityId::new(10), (1, "alice"), 60)
        .with_entries(CommunityId::new(20), (1, "alice"), 3)
        .with_entries(CommunityId::new(30), (3, "carol"), 4)
}

pub struct TestApp {
    pub router: Router,
    pub state_store: Arc<InMemoryStateStore>,
    pub sessions: Arc<InMemorySessions>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(directory(), action_log())
    }

    pub fn with(directory: InMemoryDirectory, action_log: InMemoryActionLog) -> Self {
        let state_store = Arc::new(InMemoryStateStore::new());
        let sessions = Arc::new(InMemorySessions::new());
        let state = Arc::new(AppState {
            identity_provider: Arc::new(StubProvider::new("alice")),
            state_store: state_store.clone(),
            directory: Arc::new(directory),
            action_log: Arc::new(action_log),
            sessions: sessions.clone(),
            session_config: SessionConfig {
                duration_minutes: 480,
                secure_cookies: false,
            },
        });

        Self {
            router: router(state),
            state_store,
            sessions,
        }
    }

    /// Stores a live session for `username` and returns its cookie value.
    pub async fn login_as(&self, username: &str) -> String {
        let id = ulid::Ulid::new().to_string();
        let session = Session::new(
            SessionId::new(id.clone()),
            username.to_string(),
            Duration::minutes(480),
        );
        self.sessions.create(&session).await.expect("create session");
        id
    }

    /// Sends a GET, with the session cookie when one is given.
    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(session) = session {
            request = request.header(header::COOKIE, format!("session={session}"));
        }
        let request = request.body(Body::empty()).expect("request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible")
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).expect("json")
}
