//! Referential checks: every task names an adapter that exists
//!
//! Built-in adapters are known statically. Bridges are external adapters
//! reachable over HTTP, configured by name.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use specd_core::dto::job_spec::CreateJobSpec;
use url::Url;

/// Resolves references a candidate makes to resources outside the spec
#[async_trait]
pub trait ReferenceChecker: Send + Sync {
    /// Reasons the candidate's references cannot be resolved; empty when all resolve
    async fn check(&self, candidate: &CreateJobSpec) -> Vec<String>;
}

/// External adapter reachable at `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    pub name: String,
    pub url: Url,
}

impl Bridge {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into().trim().to_ascii_lowercase(),
            url,
        }
    }
}

/// Resolves task types against built-in adapters and configured bridges
#[derive(Debug, Clone, Default)]
pub struct AdapterChecker {
    builtin: BTreeSet<String>,
    bridges: BTreeMap<String, Url>,
}

impl AdapterChecker {
    pub fn new(builtin: impl IntoIterator<Item = String>, bridges: Vec<Bridge>) -> Self {
        Self {
            builtin: builtin.into_iter().collect(),
            bridges: bridges.into_iter().map(|b| (b.name, b.url)).collect(),
        }
    }

    pub fn is_known(&self, kind: &str) -> bool {
        self.builtin.contains(kind) || self.bridges.contains_key(kind)
    }

    pub fn bridge_url(&self, name: &str) -> Option<&Url> {
        self.bridges.get(name)
    }
}

#[async_trait]
impl ReferenceChecker for AdapterChecker {
    async fn check(&self, candidate: &CreateJobSpec) -> Vec<String> {
        let tasks = candidate.tasks.as_deref().unwrap_or_default();

        tasks
            .iter()
            .enumerate()
            .filter_map(|(i, task)| {
                let kind = task.normalized_kind()?;
                if let Some(url) = self.bridge_url(&kind) {
                    tracing::debug!("tasks[{}] resolves to bridge {} at {}", i, kind, url);
                }
                (!self.is_known(&kind))
                    .then(|| format!("tasks[{}]: no adapter or bridge named \"{}\"", i, kind))
            })
            .collect()
    }
}
