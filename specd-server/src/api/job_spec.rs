//! Job Spec API Handlers
//!
//! HTTP endpoints for listing, creating and showing job specs.

use axum::{
    Json,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use specd_core::dto::job_spec::CreateJobSpec;
use specd_core::pagination::{self, Envelope};
use specd_core::presenter::{JobSpecResource, present};
use url::Url;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::job_spec_service;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub size: Option<String>,
    pub offset: Option<String>,
}

/// GET /specs
/// List job specs one page at a time
pub async fn list_specs(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<JobSpecResource>>> {
    let Query(query) = query?;
    let cursor = pagination::parse(
        query.size.as_deref(),
        query.offset.as_deref(),
        &state.page_limits,
    )?;

    tracing::debug!(
        "Listing job specs (size {}, offset {})",
        cursor.size,
        cursor.offset
    );

    let page = job_spec_service::list_specs(state.store.as_ref(), cursor).await?;
    let items = page.specs.iter().map(|s| present(s, None)).collect();
    let base = request_url(&state.public_url, &uri);

    Ok(Json(pagination::build_envelope(
        &base, cursor, page.total, items,
    )))
}

/// POST /specs
/// Validate, save and schedule a new job spec
pub async fn create_spec(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobSpec>, JsonRejection>,
) -> ApiResult<Json<JobSpecResource>> {
    let Json(candidate) = payload?;

    let spec = state.admission.admit(candidate).await?;

    Ok(Json(present(&spec, None)))
}

/// GET /specs/{id}
/// Show a job spec with its runs
pub async fn get_spec(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobSpecResource>> {
    tracing::debug!("Getting job spec: {}", id);

    // A malformed ID cannot name a stored spec
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;

    let (spec, runs) = job_spec_service::get_spec_with_runs(state.store.as_ref(), id)
        .await
        .map_err(|e| ApiError::store("error fetching JobSpec", e))?;

    Ok(Json(present(&spec, Some(runs.as_slice()))))
}

/// Absolute URL of the current request, used as the base for page links.
///
/// The request path is appended to any path already on `public_url`, so a
/// server mounted under a prefix keeps it in its links.
fn request_url(public_url: &Url, uri: &axum::http::Uri) -> Url {
    let prefix = public_url.path().trim_end_matches('/');

    let mut url = public_url.clone();
    url.set_path(&format!("{}{}", prefix, uri.path()));
    url.set_query(uri.query());
    url
}
