//! Resource presenter
//!
//! Maps domain entities to the JSON representation served by the API.
//! Presenting is a pure function: no validation, no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job_run::{JobRun, RunStatus};
use crate::domain::job_spec::{Initiator, JobSpec, Task};

/// Wire representation of a Job Specification
///
/// `runs` is only present when run history was requested (the show endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpecResource {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub initiators: Vec<Initiator>,
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub runs: Option<Vec<JobRunResource>>,
}

/// Wire representation of a Job Run embedded in its spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunResource {
    pub id: Uuid,
    pub job_id: Uuid,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<serde_json::Value>,
}

impl From<&JobRun> for JobRunResource {
    fn from(run: &JobRun) -> Self {
        Self {
            id: run.id,
            job_id: run.job_id,
            status: run.status,
            created_at: run.created_at,
            completed_at: run.completed_at,
            result: run.result.clone(),
        }
    }
}

/// Present a spec, embedding `runs` in the order given when supplied.
pub fn present(spec: &JobSpec, runs: Option<&[JobRun]>) -> JobSpecResource {
    JobSpecResource {
        id: spec.id,
        created_at: spec.created_at,
        initiators: spec.initiators.clone(),
        tasks: spec.tasks.clone(),
        start_at: spec.start_at,
        end_at: spec.end_at,
        runs: runs.map(|runs| runs.iter().map(JobRunResource::from).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::Map;

    fn spec() -> JobSpec {
        JobSpec {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            initiators: vec![Initiator {
                kind: "web".to_string(),
                params: Map::new(),
            }],
            tasks: vec![Task {
                kind: "noop".to_string(),
                params: Map::new(),
            }],
            start_at: None,
            end_at: None,
        }
    }

    fn run(job_id: Uuid, minutes: i64, status: RunStatus) -> JobRun {
        JobRun {
            id: Uuid::new_v4(),
            job_id,
            status,
            created_at: Utc::now() + Duration::minutes(minutes),
            completed_at: None,
            result: None,
        }
    }

    #[test]
    fn test_present_without_runs_omits_history() {
        let value = serde_json::to_value(present(&spec(), None)).unwrap();
        assert!(value.get("runs").is_none());
        assert!(value.get("startAt").is_none());
    }

    #[test]
    fn test_present_is_deterministic() {
        let spec = spec();
        assert_eq!(present(&spec, None), present(&spec, None));

        let runs = vec![run(spec.id, 0, RunStatus::Completed)];
        assert_eq!(
            present(&spec, Some(runs.as_slice())),
            present(&spec, Some(runs.as_slice()))
        );
    }

    #[test]
    fn test_runs_keep_store_order() {
        let spec = spec();
        let runs = vec![
            run(spec.id, 5, RunStatus::Errored),
            run(spec.id, 1, RunStatus::Completed),
        ];

        let presented = present(&spec, Some(runs.as_slice()));
        let ids: Vec<Uuid> = presented.runs.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![runs[0].id, runs[1].id]);
    }

    #[test]
    fn test_empty_runs_are_serialized() {
        let value = serde_json::to_value(present(&spec(), Some(&[][..]))).unwrap();
        assert_eq!(value["runs"], serde_json::json!([]));
    }
}
