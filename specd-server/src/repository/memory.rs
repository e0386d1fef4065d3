//! In-memory job spec store
//!
//! Used when no database is configured and as the store in tests.

use async_trait::async_trait;
use specd_core::domain::job_run::JobRun;
use specd_core::domain::job_spec::JobSpec;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{EntityKind, JobSpecStore, StoreError, StoreResult};

/// Insertion-ordered vectors behind a single lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    specs: Vec<JobSpec>,
    runs: Vec<JobRun>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run, as the execution subsystem would
    pub async fn insert_run(&self, run: JobRun) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.specs.iter().any(|s| s.id == run.job_id) {
            return Err(StoreError::NotFound);
        }
        inner.runs.push(run);
        Ok(())
    }
}

#[async_trait]
impl JobSpecStore for MemoryStore {
    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        let n = match kind {
            EntityKind::JobSpec => inner.specs.len(),
            EntityKind::JobRun => inner.runs.len(),
        };
        Ok(n as u64)
    }

    async fn list_specs(&self, limit: usize, skip: usize) -> StoreResult<Vec<JobSpec>> {
        let inner = self.inner.read().await;
        // sort_by_key is stable, so equal timestamps keep insertion order
        let mut ordered: Vec<&JobSpec> = inner.specs.iter().collect();
        ordered.sort_by_key(|s| s.created_at);

        Ok(ordered.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_spec(&self, id: Uuid) -> StoreResult<JobSpec> {
        let inner = self.inner.read().await;
        inner
            .specs
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_spec(&self, spec: &JobSpec) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.specs.iter().any(|s| s.id == spec.id) {
            return Err(StoreError::Conflict(spec.id));
        }
        inner.specs.push(spec.clone());
        Ok(())
    }

    async fn runs_for(&self, job_id: Uuid) -> StoreResult<Vec<JobRun>> {
        let inner = self.inner.read().await;
        let mut runs: Vec<JobRun> = inner
            .runs
            .iter()
            .filter(|r| r.job_id == job_id)
            .cloned()
            .collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }
}
