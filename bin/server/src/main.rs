use modlog_server::{
    app::router,
    auth::{AppState, RedditOAuthClient},
    config::ServerConfig,
    db::{PgActionLog, PgDirectory, PgSessionRepository, PgStateStore, SessionRepository},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // Cleanup expired sessions on startup
    let sessions = Arc::new(PgSessionRepository::new(db_pool.clone()));
    match sessions.delete_expired().await {
        Ok(count) if count > 0 => {
            tracing::info!(
                deleted_sessions = count,
                "Cleaned up expired sessions on startup"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to cleanup expired sessions on startup");
        }
    }

    let identity_provider =
        RedditOAuthClient::new(&config.oauth).expect("failed to configure OAuth client");

    let app_state = Arc::new(AppState {
        identity_provider: Arc::new(identity_provider),
        state_store: Arc::new(PgStateStore::new(
            db_pool.clone(),
            config.state.ttl(),
            config.state.policy(),
        )),
        directory: Arc::new(PgDirectory::new(db_pool.clone())),
        action_log: Arc::new(PgActionLog::new(db_pool)),
        sessions,
        session_config: config.session,
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
