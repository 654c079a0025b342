use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod organisations;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/users/:id", get(users::get_user))
        .nest("/organisations", organisations::router())
}
