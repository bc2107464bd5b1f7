// routes.rs
use std::time::Duration;

use axum::{
    handler::Handler,
    middleware,
    routing::{get, post},
    Router,
};
use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use tower_http::cors::{Any, CorsLayer};

use crate::gate::require_session;
use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let create_poll = handlers::create_poll
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api = Router::new()
        .route("/polls", get(handlers::list_polls).post(create_poll))
        .route("/polls/validate", post(handlers::validate_poll))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/reset-password", post(handlers::reset_password));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}
