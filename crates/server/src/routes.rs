pub mod admin;
pub mod eleve;

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

/// Booklets can embed images; accept large JSON bodies.
pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: student API, admin API, health and
/// the static front-end as fallback.
pub fn build_router(state: ServerState, cors: CorsLayer, static_dir: &Path) -> Router {
    let eleve_routes = Router::new()
        .route("/api/login", post(eleve::login))
        .route("/api/save/:id", post(eleve::save))
        .route("/api/load/:id", get(eleve::load));

    let admin_routes = Router::new()
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/eleves", post(admin::list_eleves))
        .route("/api/admin/eleve/:id", post(admin::get_eleve));

    Router::new()
        .route("/health", get(health))
        .merge(eleve_routes)
        .merge(admin_routes)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
