//! API 模块
//!
//! 提供聊天 REST API。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::error::AppError;
use crate::observability::metrics_middleware;
use crate::security::middleware::{cors_layer, security_headers_middleware};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new().merge(routes::chat_routes::create_chat_router());

    Router::new()
        .nest("/api/v1", api)
        // Add security headers middleware to all routes
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(
            app_state.metrics.clone(),
            metrics_middleware,
        ))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn initialize_api(app_state: AppState, cors_origins: &[String]) -> Result<Router, AppError> {
    tracing::info!("Initializing API router...");
    Ok(create_router(app_state, cors_origins))
}
