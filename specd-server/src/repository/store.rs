//! Store facade
//!
//! The contract every job spec backend satisfies. Components receive an
//! `Arc<dyn JobSpecStore>` rather than reaching for a global, so tests can
//! swap in [`MemoryStore`](super::memory::MemoryStore).

use async_trait::async_trait;
use specd_core::domain::job_run::JobRun;
use specd_core::domain::job_spec::JobSpec;
use specd_core::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

/// Entities the store can count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    JobSpec,
    JobRun,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("a record with id {0} already exists")]
    Conflict(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Unavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence operations over job specs and their runs.
///
/// Implementations own their concurrency control. Listing is ascending by
/// creation time with ties broken by insertion order.
#[async_trait]
pub trait JobSpecStore: Send + Sync {
    /// Number of persisted entities of `kind`
    async fn count(&self, kind: EntityKind) -> StoreResult<u64>;

    /// One page of specs ordered by creation time
    async fn list_specs(&self, limit: usize, skip: usize) -> StoreResult<Vec<JobSpec>>;

    /// Look up a spec; `StoreError::NotFound` when absent
    async fn find_spec(&self, id: Uuid) -> StoreResult<JobSpec>;

    /// Persist a new spec; `StoreError::Conflict` if the ID is already taken
    async fn insert_spec(&self, spec: &JobSpec) -> StoreResult<()>;

    /// Runs belonging to `job_id`, oldest first
    async fn runs_for(&self, job_id: Uuid) -> StoreResult<Vec<JobRun>>;
}
