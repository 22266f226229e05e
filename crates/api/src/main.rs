use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod config;
mod handlers;
mod metrics;

use config::AppConfig;
use metrics::Metrics;
use store::RosterStore;

pub struct AppState {
    pub store: RosterStore,
    pub config: AppConfig,
    pub metrics: Arc<Metrics>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let max_body = config.upload.max_body_bytes;

    let state = Arc::new(AppState {
        store: RosterStore::new(),
        config,
        metrics: Metrics::new(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        // Search
        .route("/api/suggest", get(handlers::suggest))
        .route("/api/search-agent", get(handlers::search_agent))
        // Distribution views
        .route("/api/get_tm_agents/:tm_name", get(handlers::get_tm_agents))
        .route("/api/get_tl_agents/:tl_name", get(handlers::get_tl_agents))
        .route(
            "/api/get_group_agents/:group_name",
            get(handlers::get_group_agents),
        )
        // Upload / files
        .route(
            "/api/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(max_body)),
        )
        .route("/api/upload/progress/:id", get(handlers::upload_progress))
        .route("/api/files", get(handlers::list_files))
        .route("/api/files/:filename/dates", get(handlers::file_dates))
        // Deletion requests
        .route(
            "/api/delete-requests",
            post(handlers::create_delete_request),
        )
        .route(
            "/api/delete-requests/pending",
            get(handlers::pending_delete_requests),
        )
        .route(
            "/api/delete-requests/:id/approve",
            post(handlers::approve_delete_request),
        )
        .route(
            "/api/delete-requests/:id/deny",
            post(handlers::deny_delete_request),
        )
        .route("/api/notifications", get(handlers::notifications))
        // Agent updates
        .route(
            "/api/update-agent-status",
            post(handlers::update_agent_status),
        )
        .route("/api/update-agent", post(handlers::update_agent))
        // Activity log
        .route("/api/logs", get(handlers::view_logs))
        .route("/api/logs/clear", post(handlers::clear_logs))
        // Admin panel
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/:id", delete(handlers::delete_user))
        .route("/api/roles", get(handlers::list_roles))
        .route(
            "/api/team-managers",
            get(handlers::list_team_managers).post(handlers::create_team_manager),
        )
        .route(
            "/api/team-managers/:name/deactivate",
            post(handlers::deactivate_team_manager),
        )
        .route(
            "/api/team-leaders",
            get(handlers::list_team_leaders).post(handlers::create_team_leader),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind API address");

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.unwrap();
}
