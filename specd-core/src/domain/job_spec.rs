//! Job specification domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Persisted definition of an automatable task.
///
/// `id` and `created_at` are assigned at admission and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub initiators: Vec<Initiator>,
    pub tasks: Vec<Task>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

/// Describes what triggers a run of the job (`web`, `cron`, `runat`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initiator {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// One step of the job's pipeline, executed by the adapter named in `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl JobSpec {
    /// Whether the spec's active window contains `at`.
    ///
    /// A missing bound leaves that side of the window open.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        let started = self.start_at.is_none_or(|start| start <= at);
        let not_ended = self.end_at.is_none_or(|end| at <= end);
        started && not_ended
    }

    /// Initiator types in declaration order
    pub fn initiator_kinds(&self) -> Vec<&str> {
        self.initiators.iter().map(|i| i.kind.as_str()).collect()
    }
}
