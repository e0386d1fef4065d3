//! Application wiring
//!
//! Builds the store, validator, scheduler and router from a [`ServerConfig`].

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use specd_core::domain::job_spec::JobSpec;
use tokio::sync::mpsc;

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::db;
use crate::repository::{JobSpecStore, MemoryStore, PgStore};
use crate::service::{AdmissionService, QueueScheduler};
use crate::validation::Validator;

pub struct App {
    pub router: Router,
    /// Receiving end of the scheduler handoff
    pub scheduled: mpsc::Receiver<JobSpec>,
}

/// Connect the configured store and assemble the application
pub async fn build(config: &ServerConfig) -> anyhow::Result<App> {
    let store: Arc<dyn JobSpecStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(url)
                .await
                .context("Failed to create database pool")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, job specs are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(with_store(config, store))
}

/// Assemble the application around an existing store
pub fn with_store(config: &ServerConfig, store: Arc<dyn JobSpecStore>) -> App {
    let (scheduler, scheduled) = QueueScheduler::new(config.scheduler_queue);
    let validator = Validator::with_bridges(config.bridges.clone());
    let admission = AdmissionService::new(store.clone(), validator, Arc::new(scheduler));

    let state = AppState {
        store,
        admission,
        page_limits: config.page_limits,
        public_url: config.public_url.clone(),
    };

    App {
        router: api::create_router(state, config.request_timeout),
        scheduled,
    }
}
