//! API Error Handling
//!
//! Unified error type and conversion for API responses. Every failure is
//! answered with `{ "errors": [message, ...] }` and the matching status.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use specd_core::error::ErrorKind;
use specd_core::pagination::PaginationError;
use thiserror::Error;

use crate::repository::StoreError;
use crate::service::AdmissionError;
use crate::service::job_spec::ListError;
use crate::validation::ValidationError;

pub const NOT_FOUND_MESSAGE: &str = "JobSpec not found.";
pub const TIMEOUT_MESSAGE: &str = "request timed out";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidPagination(#[from] PaginationError),

    /// Query string that could not be decoded at all (e.g. `size` given twice)
    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    MalformedBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("JobSpec not found.")]
    NotFound,

    /// Store failure; only `context` reaches the client
    #[error("{context}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    SchedulingFailed(String),

    #[error("request timed out")]
    Timeout,
}

impl ApiError {
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        match source {
            StoreError::NotFound => ApiError::NotFound,
            source => ApiError::Store {
                context: context.into(),
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidPagination(e) => e.kind(),
            ApiError::InvalidQuery(_) | ApiError::MalformedBody(_) => ErrorKind::InvalidArgument,
            ApiError::Validation(e) => e.kind(),
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Store { source, .. } => source.kind(),
            ApiError::SchedulingFailed(_) => ErrorKind::SchedulingFailed,
            ApiError::Timeout => ErrorKind::Timeout,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Pagination problems are 422 whether caught by parsing or by the extractor
            ApiError::InvalidPagination(_) | ApiError::InvalidQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            _ => match self.kind() {
                ErrorKind::InvalidArgument | ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Messages for the response body, never empty
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(e) => e.reasons().to_vec(),
            other => vec![other.to_string()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match &self {
            ApiError::Store { context, source } => {
                tracing::error!("{}: {}", context, source);
            }
            _ if kind.is_client_error() => {
                tracing::debug!("Rejected request ({:?}): {}", kind, self);
            }
            _ => {
                tracing::warn!("Request failed ({:?}): {}", kind, self);
            }
        }

        let status = self.status();
        (status, Json(serde_json::json!({ "errors": self.messages() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        let context = err.to_string();
        match err {
            ListError::Count(source) | ListError::Page(source) => ApiError::store(context, source),
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Validation(e) => ApiError::Validation(e),
            AdmissionError::Store(source) => ApiError::store("error saving JobSpec", source),
            scheduling @ AdmissionError::Scheduling { .. } => {
                ApiError::SchedulingFailed(scheduling.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
