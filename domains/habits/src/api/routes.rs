//! Route definitions for the habits API

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers::{api_keys, auth, boards, check_ins};
use super::middleware::HabitsState;

/// Session and identity routes
fn auth_routes() -> Router<HabitsState> {
    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route(
            "/api/auth/session",
            get(auth::get_session).post(auth::create_session),
        )
        .route("/api/auth/refresh", post(auth::refresh_session))
        .route("/api/auth/verify", post(auth::verify))
}

/// API key management routes
fn api_key_routes() -> Router<HabitsState> {
    Router::new()
        .route(
            "/api/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/api/api-keys/{id}", delete(api_keys::revoke_api_key))
}

fn board_routes() -> Router<HabitsState> {
    Router::new()
        .route(
            "/api/boards",
            get(boards::list_boards).post(boards::create_board),
        )
        .route("/api/boards/{id}", patch(boards::update_board))
}

fn check_in_routes() -> Router<HabitsState> {
    Router::new()
        .route(
            "/api/check-ins",
            get(check_ins::list_check_ins).post(check_ins::create_check_in),
        )
        .route("/api/check-ins/{id}", patch(check_ins::update_check_in))
}

/// Create all habits domain routes
pub fn routes() -> Router<HabitsState> {
    Router::new()
        .merge(auth_routes())
        .merge(api_key_routes())
        .merge(board_routes())
        .merge(check_in_routes())
}
