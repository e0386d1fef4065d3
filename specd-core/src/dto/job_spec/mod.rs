//! Job specification DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::job_spec::{Initiator, JobSpec, Task};

/// Request to create a new job specification
///
/// Every field is optional so that an incomplete body still decodes and the
/// validation pipeline can report each missing piece.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobSpec {
    #[serde(default)]
    pub initiators: Option<Vec<DefinitionInput>>,
    #[serde(default)]
    pub tasks: Option<Vec<DefinitionInput>>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

/// An initiator or task as submitted by a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionInput {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl DefinitionInput {
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            params: Some(params),
        }
    }

    /// The type name, trimmed and lowercased, if one was given
    pub fn normalized_kind(&self) -> Option<String> {
        self.kind
            .as_deref()
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
    }

    /// The params object, or an empty map when absent or not an object
    pub fn params_map(&self) -> Map<String, Value> {
        match &self.params {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

impl CreateJobSpec {
    /// Build the domain record from an already-validated candidate.
    ///
    /// Absent collections become empty; callers run validation first.
    pub fn into_job_spec(self, id: Uuid, created_at: DateTime<Utc>) -> JobSpec {
        let initiators = self
            .initiators
            .unwrap_or_default()
            .iter()
            .map(|d| Initiator {
                kind: d.normalized_kind().unwrap_or_default(),
                params: d.params_map(),
            })
            .collect();

        let tasks = self
            .tasks
            .unwrap_or_default()
            .iter()
            .map(|d| Task {
                kind: d.normalized_kind().unwrap_or_default(),
                params: d.params_map(),
            })
            .collect();

        JobSpec {
            id,
            created_at,
            initiators,
            tasks,
            start_at: self.start_at,
            end_at: self.end_at,
        }
    }
}
