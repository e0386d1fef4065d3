//! Job Admission Service
//!
//! Validate, persist, then hand off to the scheduler. The steps run in order
//! for a single request:
//!
//! ```text
//! Candidate -> Validated -> Persisted -> Scheduled
//!     |            |            |
//!  Rejected   PersistFailed  SchedulingFailed (spec stays persisted)
//! ```
//!
//! Persistence is the durability boundary. Nothing after it rolls back, so a
//! scheduling failure leaves a stored spec that is not yet scheduled.

use std::sync::Arc;

use chrono::Utc;
use specd_core::domain::job_spec::JobSpec;
use specd_core::dto::job_spec::CreateJobSpec;
use specd_core::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::{JobSpecStore, StoreError};
use crate::service::scheduler::{Scheduler, SchedulerError};
use crate::validation::{ValidationError, Validator};

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("error saving JobSpec: {0}")]
    Store(#[from] StoreError),

    #[error("JobSpec {} was saved but could not be scheduled: {source}", .spec.id)]
    Scheduling {
        spec: Box<JobSpec>,
        source: SchedulerError,
    },
}

impl AdmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdmissionError::Validation(e) => e.kind(),
            AdmissionError::Store(e) => e.kind(),
            AdmissionError::Scheduling { source, .. } => source.kind(),
        }
    }

    /// The stored spec, when the failure happened after persistence
    pub fn persisted_spec(&self) -> Option<&JobSpec> {
        match self {
            AdmissionError::Scheduling { spec, .. } => Some(spec),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AdmissionService {
    store: Arc<dyn JobSpecStore>,
    validator: Validator,
    scheduler: Arc<dyn Scheduler>,
}

impl AdmissionService {
    pub fn new(
        store: Arc<dyn JobSpecStore>,
        validator: Validator,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            store,
            validator,
            scheduler,
        }
    }

    /// Admit a candidate, returning the persisted spec
    pub async fn admit(&self, candidate: CreateJobSpec) -> Result<JobSpec, AdmissionError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        if let Err(e) = self.validator.validate(&candidate).await {
            tracing::info!(
                "JobSpec candidate {} rejected ({} check): {}",
                id,
                e.category(),
                e
            );
            return Err(e.into());
        }

        let spec = candidate.into_job_spec(id, created_at);

        self.store.insert_spec(&spec).await.map_err(|e| {
            tracing::error!("Failed to persist JobSpec {}: {}", spec.id, e);
            e
        })?;

        tracing::info!(
            "JobSpec created: {} [{}]",
            spec.id,
            self.validator.definitions().describe(&spec).join(" -> ")
        );

        if let Err(source) = self.scheduler.register(&spec).await {
            tracing::warn!(
                "JobSpec {} persisted but not scheduled: {}",
                spec.id,
                source
            );
            return Err(AdmissionError::Scheduling {
                spec: Box::new(spec),
                source,
            });
        }

        Ok(spec)
    }
}
