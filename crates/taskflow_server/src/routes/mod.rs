//! Router assembly and cross-cutting HTTP layers.
//!
//! # Invariants
//! - Panics inside handlers become a 500 failure envelope.
//! - Every request is logged with method, path, status and duration only.
//! - Unknown routes return a 404 failure envelope.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info, warn};
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

pub mod auth;
pub mod health;
pub mod tasks;

/// Builds the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth::router())
        .nest("/api/tasks", tasks::router())
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started_at.elapsed().as_millis();
    if response.status().is_server_error() {
        warn!("event=http_request module=api status=error method={method} path={path} http_status={status} duration_ms={duration_ms}");
    } else {
        info!("event=http_request module=api status=ok method={method} path={path} http_status={status} duration_ms={duration_ms}");
    }
    response
}

fn panic_response(_payload: Box<dyn Any + Send + 'static>) -> Response {
    // Payload detail is already logged by the core panic hook.
    error!("event=http_panic module=api status=error");
    ApiError::Internal("handler panicked".to_string()).into_response()
}
