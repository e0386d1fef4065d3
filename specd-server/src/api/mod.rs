//! API Module
//!
//! HTTP API layer for specd.
//! Each submodule handles endpoints for a specific resource.

pub mod error;
pub mod health;
pub mod job_spec;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use specd_core::pagination::PageLimits;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::api::error::ApiError;
use crate::repository::JobSpecStore;
use crate::service::AdmissionService;

/// Shared handler state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobSpecStore>,
    pub admission: AdmissionService,
    pub page_limits: PageLimits,
    /// Base for absolute pagination links
    pub public_url: Url,
}

/// Create the main API router with all endpoints
///
/// `request_timeout` bounds each request, including the store reads and the
/// scheduler handoff made while serving it.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job spec endpoints
        .route(
            "/specs",
            get(job_spec::list_specs).post(job_spec::create_spec),
        )
        .route("/specs/{id}", get(job_spec::get_spec))
        // Add state and middleware
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_body))
        .layer(TraceLayer::new_for_http())
}

/// Give the bare response from the timeout layer the usual error body
async fn timeout_body(response: Response) -> Response {
    let bare = response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE);
    if bare {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}
