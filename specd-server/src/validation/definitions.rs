//! Semantic checks for initiator and task definitions
//!
//! Each definition type registers a [`DefinitionValidator`]. The registry
//! dispatches on the definition's `type`; params stay opaque JSON to
//! everything outside the matching validator.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde_json::{Map, Value};
use specd_core::domain::job_spec::JobSpec;
use specd_core::dto::job_spec::{CreateJobSpec, DefinitionInput};
use url::Url;

/// Capability contract for one initiator or task type
pub trait DefinitionValidator: Send + Sync {
    /// The `type` value this validator handles (lowercase)
    fn kind(&self) -> &'static str;

    /// Short human-readable summary of a definition with these params
    fn describe(&self, params: &Map<String, Value>) -> String;

    /// Problems with `params`; empty when valid
    fn validate(&self, params: &Map<String, Value>) -> Vec<String>;
}

#[derive(Default)]
pub struct DefinitionRegistry {
    initiators: BTreeMap<&'static str, Box<dyn DefinitionValidator>>,
    tasks: BTreeMap<&'static str, Box<dyn DefinitionValidator>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_initiator(WebInitiator);
        registry.register_initiator(CronInitiator);
        registry.register_initiator(RunAtInitiator);
        registry.register_initiator(LogInitiator("ethlog"));
        registry.register_initiator(LogInitiator("runlog"));

        registry.register_task(HttpTask("httpget"));
        registry.register_task(HttpTask("httppost"));
        registry.register_task(JsonParseTask);
        registry.register_task(MultiplyTask);
        for kind in ["ethbytes32", "ethuint256", "ethtx", "noop"] {
            registry.register_task(PassthroughTask(kind));
        }

        registry
    }

    pub fn register_initiator(&mut self, validator: impl DefinitionValidator + 'static) {
        self.initiators.insert(validator.kind(), Box::new(validator));
    }

    pub fn register_task(&mut self, validator: impl DefinitionValidator + 'static) {
        self.tasks.insert(validator.kind(), Box::new(validator));
    }

    pub fn task_kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.keys().copied()
    }

    pub fn initiator_kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.initiators.keys().copied()
    }

    /// Semantic problems across every definition in `candidate`.
    ///
    /// Unknown initiator types are reported. Tasks without a validator are
    /// bridges (already resolved by the referential check) and pass as-is.
    pub fn check(&self, candidate: &CreateJobSpec) -> Vec<String> {
        let mut reasons = Vec::new();

        for (i, initiator) in candidate.initiators.iter().flatten().enumerate() {
            let Some(kind) = initiator.normalized_kind() else {
                continue;
            };
            match self.initiators.get(kind.as_str()) {
                Some(validator) => collect(&mut reasons, "initiators", i, initiator, &**validator),
                None => reasons.push(format!(
                    "initiators[{}]: unknown initiator type \"{}\"",
                    i, kind
                )),
            }
        }

        for (i, task) in candidate.tasks.iter().flatten().enumerate() {
            let Some(kind) = task.normalized_kind() else {
                continue;
            };
            if let Some(validator) = self.tasks.get(kind.as_str()) {
                collect(&mut reasons, "tasks", i, task, &**validator);
            }
        }

        reasons
    }

    /// One line per definition of a persisted spec, for logging
    pub fn describe(&self, spec: &JobSpec) -> Vec<String> {
        let initiators = spec.initiators.iter().map(|i| {
            self.initiators
                .get(i.kind.as_str())
                .map(|v| v.describe(&i.params))
                .unwrap_or_else(|| i.kind.clone())
        });
        let tasks = spec.tasks.iter().map(|t| {
            self.tasks
                .get(t.kind.as_str())
                .map(|v| v.describe(&t.params))
                .unwrap_or_else(|| format!("bridge {}", t.kind))
        });
        initiators.chain(tasks).collect()
    }
}

fn collect(
    reasons: &mut Vec<String>,
    field: &str,
    index: usize,
    definition: &DefinitionInput,
    validator: &dyn DefinitionValidator,
) {
    let params = definition.params_map();
    reasons.extend(
        validator
            .validate(&params)
            .into_iter()
            .map(|r| format!("{}[{}] ({}): {}", field, index, validator.kind(), r)),
    );
}

fn string_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

// =============================================================================
// Initiators
// =============================================================================

struct WebInitiator;

impl DefinitionValidator for WebInitiator {
    fn kind(&self) -> &'static str {
        "web"
    }

    fn describe(&self, _params: &Map<String, Value>) -> String {
        "triggered over the API".to_string()
    }

    fn validate(&self, _params: &Map<String, Value>) -> Vec<String> {
        Vec::new()
    }
}

struct CronInitiator;

const CRON_DESCRIPTORS: &[&str] = &[
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

impl CronInitiator {
    fn schedule_is_valid(schedule: &str) -> bool {
        let schedule = schedule.trim();
        if let Some(interval) = schedule.strip_prefix("@every ") {
            return !interval.trim().is_empty();
        }
        if schedule.starts_with('@') {
            return CRON_DESCRIPTORS.contains(&schedule);
        }

        let fields: Vec<&str> = schedule.split_whitespace().collect();
        (5..=6).contains(&fields.len())
            && fields.iter().all(|field| {
                field
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "*,-/?".contains(c))
            })
    }
}

impl DefinitionValidator for CronInitiator {
    fn kind(&self) -> &'static str {
        "cron"
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        format!("cron \"{}\"", string_param(params, "schedule").unwrap_or(""))
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        match string_param(params, "schedule") {
            None => vec!["schedule is required".to_string()],
            Some(s) if !Self::schedule_is_valid(s) => {
                vec![format!("schedule \"{}\" is not a valid cron expression", s)]
            }
            Some(_) => Vec::new(),
        }
    }
}

struct RunAtInitiator;

impl DefinitionValidator for RunAtInitiator {
    fn kind(&self) -> &'static str {
        "runat"
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        format!("run at {}", string_param(params, "time").unwrap_or("?"))
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        match string_param(params, "time") {
            None => vec!["time is required".to_string()],
            Some(t) if DateTime::parse_from_rfc3339(t).is_err() => {
                vec![format!("time \"{}\" is not an RFC 3339 timestamp", t)]
            }
            Some(_) => Vec::new(),
        }
    }
}

/// `ethlog` and `runlog`: watch contract logs, optionally filtered by address
struct LogInitiator(&'static str);

fn is_eth_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

impl DefinitionValidator for LogInitiator {
    fn kind(&self) -> &'static str {
        self.0
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        match string_param(params, "address") {
            Some(address) => format!("{} from {}", self.0, address),
            None => format!("{} from any address", self.0),
        }
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        match params.get("address") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(a)) if is_eth_address(a) => Vec::new(),
            Some(other) => vec![format!("address {} is not a 0x-prefixed 20 byte hex address", other)],
        }
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// `httpget` and `httppost`
struct HttpTask(&'static str);

impl DefinitionValidator for HttpTask {
    fn kind(&self) -> &'static str {
        self.0
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        format!("{} {}", self.0, string_param(params, "url").unwrap_or("?"))
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        let Some(raw) = string_param(params, "url") else {
            return vec!["url is required".to_string()];
        };
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Vec::new(),
            Ok(url) => vec![format!("url scheme \"{}\" is not http or https", url.scheme())],
            Err(e) => vec![format!("url \"{}\" is invalid: {}", raw, e)],
        }
    }
}

struct JsonParseTask;

impl DefinitionValidator for JsonParseTask {
    fn kind(&self) -> &'static str {
        "jsonparse"
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        let path: Vec<&str> = params
            .get("path")
            .and_then(Value::as_array)
            .map(|p| p.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        format!("jsonparse {}", path.join("."))
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        match params.get("path").and_then(Value::as_array) {
            None => vec!["path is required and must be an array of strings".to_string()],
            Some(path) if path.is_empty() => vec!["path must not be empty".to_string()],
            Some(path) if !path.iter().all(Value::is_string) => {
                vec!["path must contain only strings".to_string()]
            }
            Some(_) => Vec::new(),
        }
    }
}

struct MultiplyTask;

impl DefinitionValidator for MultiplyTask {
    fn kind(&self) -> &'static str {
        "multiply"
    }

    fn describe(&self, params: &Map<String, Value>) -> String {
        match params.get("times") {
            Some(times) => format!("multiply by {}", times),
            None => "multiply".to_string(),
        }
    }

    fn validate(&self, params: &Map<String, Value>) -> Vec<String> {
        match params.get("times") {
            None => vec!["times is required".to_string()],
            Some(Value::Number(_)) => Vec::new(),
            Some(Value::String(s)) if s.trim().parse::<f64>().is_ok() => Vec::new(),
            Some(other) => vec![format!("times {} is not a number", other)],
        }
    }
}

/// Adapters with no required params
struct PassthroughTask(&'static str);

impl DefinitionValidator for PassthroughTask {
    fn kind(&self) -> &'static str {
        self.0
    }

    fn describe(&self, _params: &Map<String, Value>) -> String {
        self.0.to_string()
    }

    fn validate(&self, _params: &Map<String, Value>) -> Vec<String> {
        Vec::new()
    }
}
