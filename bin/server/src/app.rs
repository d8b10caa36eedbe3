//! HTTP routing.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::views;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/login", get(auth::login))
        .route("/authorize", get(auth::authorize))
        .route("/logout", get(auth::logout))
        // Listings
        .route("/", get(views::index))
        .route("/biggest", get(views::index))
        .route("/r/{community}/", get(views::by_community))
        .route("/r/{community}/page/{page}/", get(views::by_community_page))
        .route("/r/{community}/mod/{username}/", get(views::by_moderator))
        .route(
            "/r/{community}/mod/{username}/page/{page}/",
            get(views::by_moderator_page),
        )
        .route("/r/{community}/author/{username}/", get(views::by_author))
        .route(
            "/r/{community}/author/{username}/page/{page}/",
            get(views::by_author_page),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
