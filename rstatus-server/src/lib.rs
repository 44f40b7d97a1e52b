//! HTTP surface of rstatus: profile pages, profile editing and the
//! informational pages, served with axum.

pub mod auth;
pub mod handlers;
pub mod infra;
pub mod routes;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use infra::app_state::AppState;
use infra::errors::AppError;

/// Router with every route, CORS, request tracing and the JSON 404 fallback.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config().cors.allowed_origins);

    routes::create_router(state.clone())
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

async fn not_found_handler() -> AppError {
    AppError::page_not_found()
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
