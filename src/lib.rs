// Public API for integration tests and library usage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod matching;
pub mod protocol;
pub mod scoring;
pub mod state;
pub mod types;
pub mod ws;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Assemble the HTTP and WebSocket routes
pub fn build_router(state: Arc<state::AppState>, auth_config: Arc<auth::AuthConfig>) -> Router {
    // Staff-only HTTP routes (with HTTP Basic Auth)
    let staff_routes = Router::new()
        .route("/api/staff/games/import", post(api::import_game))
        .layer(middleware::from_fn_with_state(
            auth_config.clone(),
            auth::staff_auth_middleware,
        ));

    // `role=staff` sockets need the same credentials
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::staff_ws_auth_middleware,
        ));

    Router::new()
        .route("/api/games", get(api::list_games))
        .route("/api/games/{id}", get(api::get_game))
        .route("/api/games/{id}/scores", get(api::game_scores))
        .merge(staff_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
