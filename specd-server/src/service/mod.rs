//! Service Module
//!
//! Business logic layer for specd.
//! Services orchestrate between the store, validation and the scheduler.

pub mod admission;
pub mod job_spec;
pub mod scheduler;

// Re-export for convenience
pub use admission::{AdmissionError, AdmissionService};
pub use job_spec as job_spec_service;
pub use scheduler::{QueueScheduler, Scheduler, SchedulerError};
