//! HTTP API: router, shared state and the helpers every handler uses.
//!
//! Handlers follow one shape: parse the JSON body, check required fields,
//! check that referenced records exist, make one store call, and return a
//! `{message, <entity>}` body with the matching status code.

mod agencies;
mod categories;
mod notifications;
mod responses;
mod submissions;
mod users;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::Method,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use civic_store::StoreError;

use crate::config::ServerConfig;
use crate::db::DbHandle;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: DbHandle,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let max_body = state.config.max_body_size;

    Router::new()
        .route("/health", get(health_check))
        // Agencies
        .route("/api/agencies", get(agencies::list_agencies))
        .route("/api/agencies/:id", get(agencies::get_agency))
        .route("/api/admin/agencies/create", post(agencies::create_agency))
        .route(
            "/api/admin/agencies/:id",
            put(agencies::update_agency).delete(agencies::delete_agency),
        )
        // Categories
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/:id", get(categories::get_category))
        .route("/api/admin/categories/create", post(categories::create_category))
        .route(
            "/api/admin/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        // Users
        .route("/api/users/register", post(users::register_user))
        .route("/api/auth/login", post(users::login))
        .route("/api/users/:id", get(users::get_user))
        .route(
            "/api/users/:id/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/api/users/:id/notifications",
            get(notifications::list_user_notifications),
        )
        .route("/api/admin/users/:id", axum::routing::delete(users::delete_user))
        // Submissions
        .route("/api/submissions", get(submissions::list_submissions))
        .route("/api/submissions/create", post(submissions::create_submission))
        .route("/api/submissions/:id", get(submissions::get_submission))
        .route(
            "/api/submissions/:id/responses",
            get(responses::list_responses),
        )
        .route(
            "/api/admin/submissions/:id",
            axum::routing::delete(submissions::delete_submission),
        )
        .route(
            "/api/admin/submissions/:id/status",
            put(submissions::update_status),
        )
        .route(
            "/api/admin/submissions/:id/responses",
            post(responses::create_response),
        )
        // Notifications
        .route(
            "/api/admin/notifications/create",
            post(notifications::create_notification),
        )
        .route(
            "/api/notifications/:id",
            axum::routing::delete(notifications::delete_notification),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// The trimmed value of a required text field, or `None` if absent or blank.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Optional text field: blank collapses to `None`.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn the store's generic not-found into an entity-specific 404.
fn found<T>(result: Result<T, StoreError>, message: &str) -> Result<T, ApiError> {
    match result {
        Err(StoreError::NotFound) => Err(ApiError::not_found(message)),
        other => Ok(other?),
    }
}

/// Ids arrive as strings; anything that is not a UUID cannot name a record.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
