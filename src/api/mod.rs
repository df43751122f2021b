//! API module for handling HTTP requests and responses

#[cfg(feature = "web")]
mod cors;
#[cfg(feature = "web")]
pub(crate) mod handlers;
#[cfg(feature = "web")]
pub(crate) mod responses;

#[cfg(feature = "web")]
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
#[cfg(feature = "web")]
use std::sync::Arc;
#[cfg(feature = "web")]
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
#[cfg(feature = "web")]
use crate::state::AppState;

#[cfg(feature = "web")]
use handlers::*;

#[cfg(feature = "web")]
/// Create the application router with all routes
///
/// Wrong methods on known paths fall through to the same 404 as unknown paths.
/// CORS is the outermost layer so every response carries its headers.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(ping).fallback(not_found))
        .route("/mode", get(get_mode).fallback(not_found))
        .route("/vote", post(submit_vote).fallback(not_found))
        .route("/reset", post(reset).fallback(not_found))
        // Admin endpoints, gated by x-admin-secret
        .route("/admin/close", post(admin_toggle_mode).fallback(not_found))
        .route("/admin/reset", post(admin_reset_tally).fallback(not_found))
        .route("/admin/stats", get(admin_stats).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn(cors::cors))
}
