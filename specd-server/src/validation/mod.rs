//! Validation pipeline
//!
//! Checks a candidate job spec before admission. Three categories run in
//! order and the pipeline stops at the first category that reports anything;
//! within a category every reason is collected.
//!
//! 1. Structural: required fields present and well-typed ([`structural`])
//! 2. Referential: task adapters resolve to something known ([`references`])
//! 3. Semantic: per-type parameter checks ([`definitions`])
//!
//! Validation never writes anything.

pub mod definitions;
pub mod references;
pub mod structural;

use std::fmt;
use std::sync::Arc;

use specd_core::dto::job_spec::CreateJobSpec;
use specd_core::error::ErrorKind;
use thiserror::Error;

pub use definitions::{DefinitionRegistry, DefinitionValidator};
pub use references::{AdapterChecker, Bridge, ReferenceChecker};

/// Which stage of the pipeline rejected the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Structural,
    Referential,
    Semantic,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Structural => "structural",
            Category::Referential => "referential",
            Category::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

/// Rejection with every reason found in the failing category
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .reasons.join("; "))]
pub struct ValidationError {
    category: Category,
    reasons: Vec<String>,
}

impl ValidationError {
    /// `reasons` must be non-empty
    fn new(category: Category, reasons: Vec<String>) -> Self {
        debug_assert!(!reasons.is_empty());
        Self { category, reasons }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

#[derive(Clone)]
pub struct Validator {
    references: Arc<dyn ReferenceChecker>,
    definitions: Arc<DefinitionRegistry>,
}

impl Validator {
    pub fn new(references: Arc<dyn ReferenceChecker>, definitions: Arc<DefinitionRegistry>) -> Self {
        Self {
            references,
            definitions,
        }
    }

    /// Built-in initiator and task types, plus the given bridges
    pub fn with_bridges(bridges: Vec<Bridge>) -> Self {
        let definitions = Arc::new(DefinitionRegistry::with_builtins());
        let references = Arc::new(AdapterChecker::new(
            definitions.task_kinds().map(str::to_string),
            bridges,
        ));
        Self::new(references, definitions)
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    pub async fn validate(&self, candidate: &CreateJobSpec) -> Result<(), ValidationError> {
        let reasons = structural::check(candidate);
        if !reasons.is_empty() {
            return Err(ValidationError::new(Category::Structural, reasons));
        }

        let reasons = self.references.check(candidate).await;
        if !reasons.is_empty() {
            return Err(ValidationError::new(Category::Referential, reasons));
        }

        let reasons = self.definitions.check(candidate);
        if !reasons.is_empty() {
            return Err(ValidationError::new(Category::Semantic, reasons));
        }

        Ok(())
    }
}
