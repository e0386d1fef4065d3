//! Scheduler handoff
//!
//! After a spec is persisted it is handed to the execution subsystem through
//! [`Scheduler::register`]. Execution itself lives elsewhere; the queue
//! scheduler below is the hand-off point that subsystem consumes from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use specd_core::domain::job_spec::JobSpec;
use specd_core::error::ErrorKind;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler queue is full")]
    QueueFull,
    #[error("scheduler is not running")]
    Closed,
    #[error("scheduler rejected job spec: {0}")]
    Rejected(String),
}

impl SchedulerError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SchedulingFailed
    }
}

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Make a persisted spec eligible for execution
    async fn register(&self, spec: &JobSpec) -> Result<(), SchedulerError>;
}

/// Bounded queue of newly admitted specs
#[derive(Debug, Clone)]
pub struct QueueScheduler {
    tx: mpsc::Sender<JobSpec>,
}

impl QueueScheduler {
    /// Create the scheduler and the receiving end the executor drains
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobSpec>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Scheduler for QueueScheduler {
    async fn register(&self, spec: &JobSpec) -> Result<(), SchedulerError> {
        self.tx.try_send(spec.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SchedulerError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SchedulerError::Closed,
        })
    }
}

/// Drain the queue, logging each spec as it becomes schedulable.
///
/// Runs until every [`QueueScheduler`] handle is dropped.
pub async fn run_registration_log(mut rx: mpsc::Receiver<JobSpec>) {
    while let Some(spec) = rx.recv().await {
        tracing::info!(
            "JobSpec {} registered for execution (initiators: {}, window: {})",
            spec.id,
            spec.initiator_kinds().join(", "),
            window_note(&spec, Utc::now())
        );
    }
    tracing::debug!("Scheduler queue closed");
}

/// Where `now` falls relative to the spec's active window
fn window_note(spec: &JobSpec, now: DateTime<Utc>) -> &'static str {
    if spec.is_active_at(now) {
        "active"
    } else if spec.start_at.is_some_and(|start| now < start) {
        "not started"
    } else {
        "ended"
    }
}
