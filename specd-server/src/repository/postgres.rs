//! PostgreSQL job spec store
//!
//! Handles all database operations related to job specs and their runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use specd_core::domain::job_run::{JobRun, RunStatus};
use specd_core::domain::job_spec::{Initiator, JobSpec, Task};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::store::{EntityKind, JobSpecStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobSpecStore for PgStore {
    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let sql = match kind {
            EntityKind::JobSpec => "SELECT COUNT(*) FROM job_specs",
            EntityKind::JobRun => "SELECT COUNT(*) FROM job_runs",
        };

        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn list_specs(&self, limit: usize, skip: usize) -> StoreResult<Vec<JobSpec>> {
        let rows = sqlx::query_as::<_, JobSpecRow>(
            r#"
            SELECT id, created_at, initiators, tasks, start_at, end_at
            FROM job_specs
            ORDER BY created_at ASC, seq ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_i64(limit))
        .bind(to_i64(skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_spec(&self, id: Uuid) -> StoreResult<JobSpec> {
        let row = sqlx::query_as::<_, JobSpecRow>(
            r#"
            SELECT id, created_at, initiators, tasks, start_at, end_at
            FROM job_specs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into()).ok_or(StoreError::NotFound)
    }

    async fn insert_spec(&self, spec: &JobSpec) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO job_specs (id, created_at, initiators, tasks, start_at, end_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(spec.id)
        .bind(spec.created_at)
        .bind(Json(&spec.initiators))
        .bind(Json(&spec.tasks))
        .bind(spec.start_at)
        .bind(spec.end_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(spec.id)
            }
            other => other.into(),
        })?;

        Ok(())
    }

    async fn runs_for(&self, job_id: Uuid) -> StoreResult<Vec<JobRun>> {
        let rows = sqlx::query_as::<_, JobRunRow>(
            r#"
            SELECT id, job_id, status, created_at, completed_at, result
            FROM job_runs
            WHERE job_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobRun::try_from).collect()
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobSpecRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    initiators: Json<Vec<Initiator>>,
    tasks: Json<Vec<Task>>,
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
}

impl From<JobSpecRow> for JobSpec {
    fn from(row: JobSpecRow) -> Self {
        JobSpec {
            id: row.id,
            created_at: row.created_at,
            initiators: row.initiators.0,
            tasks: row.tasks.0,
            start_at: row.start_at,
            end_at: row.end_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct JobRunRow {
    id: Uuid,
    job_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<serde_json::Value>,
}

impl TryFrom<JobRunRow> for JobRun {
    type Error = StoreError;

    fn try_from(row: JobRunRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<RunStatus>()
            .map_err(StoreError::Unavailable)?;

        Ok(JobRun {
            id: row.id,
            job_id: row.job_id,
            status,
            created_at: row.created_at,
            completed_at: row.completed_at,
            result: row.result,
        })
    }
}
