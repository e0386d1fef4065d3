//! Job Spec Service
//!
//! Read paths: paginated listing and single-spec lookup with run history.

use specd_core::domain::job_run::JobRun;
use specd_core::domain::job_spec::JobSpec;
use specd_core::pagination::PaginationCursor;
use uuid::Uuid;

use crate::repository::{EntityKind, JobSpecStore, StoreError};

/// One page of specs plus the total count.
///
/// The count and the page are separate reads with no transaction around
/// them, so under concurrent admissions they can be off by the number of
/// specs admitted in between.
#[derive(Debug)]
pub struct SpecPage {
    pub specs: Vec<JobSpec>,
    pub total: u64,
}

/// Which read of a listing failed
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("error getting count of JobSpec")]
    Count(#[source] StoreError),
    #[error("error fetching JobSpecs")]
    Page(#[source] StoreError),
}

pub async fn list_specs(
    store: &dyn JobSpecStore,
    cursor: PaginationCursor,
) -> Result<SpecPage, ListError> {
    let total = store
        .count(EntityKind::JobSpec)
        .await
        .map_err(ListError::Count)?;

    let specs = store
        .list_specs(cursor.size, cursor.offset)
        .await
        .map_err(ListError::Page)?;

    Ok(SpecPage { specs, total })
}

/// Spec with its runs; `StoreError::NotFound` when the ID is unknown
pub async fn get_spec_with_runs(
    store: &dyn JobSpecStore,
    id: Uuid,
) -> Result<(JobSpec, Vec<JobRun>), StoreError> {
    let spec = store.find_spec(id).await?;
    let runs = store.runs_for(spec.id).await?;
    Ok((spec, runs))
}
