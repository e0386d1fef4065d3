//! Structural checks: required fields present and well-typed

use serde_json::Value;
use specd_core::dto::job_spec::{CreateJobSpec, DefinitionInput};

/// Every structural problem with `candidate`, in field order
pub fn check(candidate: &CreateJobSpec) -> Vec<String> {
    let mut reasons = Vec::new();

    check_definitions(
        "initiators",
        "initiator",
        candidate.initiators.as_deref(),
        &mut reasons,
    );
    check_definitions("tasks", "task", candidate.tasks.as_deref(), &mut reasons);

    if let (Some(start), Some(end)) = (candidate.start_at, candidate.end_at) {
        if start > end {
            reasons.push("startAt: cannot be after endAt".to_string());
        }
    }

    reasons
}

fn check_definitions(
    field: &str,
    noun: &str,
    definitions: Option<&[DefinitionInput]>,
    reasons: &mut Vec<String>,
) {
    let Some(definitions) = definitions else {
        reasons.push(format!("{}: field is required", field));
        return;
    };

    if definitions.is_empty() {
        reasons.push(format!("{}: must have at least one {}", field, noun));
    }

    for (i, definition) in definitions.iter().enumerate() {
        if definition.normalized_kind().is_none() {
            reasons.push(format!("{}[{}]: type is required", field, i));
        }
        match &definition.params {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => reasons.push(format!("{}[{}]: params must be an object", field, i)),
        }
    }
}
