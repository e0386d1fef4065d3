//! Server configuration
//!
//! All settings come from environment variables with defaults suitable for
//! local development.

use std::time::Duration;

use anyhow::{Context, anyhow};
use specd_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};
use url::Url;

use crate::validation::Bridge;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,

    /// Externally visible base URL, used for pagination links
    pub public_url: Url,

    pub page_limits: PageLimits,

    /// Upper bound on handling a single request
    pub request_timeout: Duration,

    /// Capacity of the scheduler handoff queue
    pub scheduler_queue: usize,

    /// Known bridge adapters
    pub bridges: Vec<Bridge>,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: usize = 30;
const DEFAULT_SCHEDULER_QUEUE: usize = 1024;

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables:
    /// - SPECD_BIND_ADDR (default: 0.0.0.0:8080)
    /// - DATABASE_URL (optional; in-memory store when unset)
    /// - SPECD_PUBLIC_URL (default: http://localhost:8080)
    /// - SPECD_DEFAULT_PAGE_SIZE (default: 25)
    /// - SPECD_MAX_PAGE_SIZE (default: 100)
    /// - SPECD_REQUEST_TIMEOUT (seconds, default: 30)
    /// - SPECD_SCHEDULER_QUEUE (default: 1024)
    /// - SPECD_BRIDGES (comma-separated name=url pairs)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("SPECD_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let database_url = var("DATABASE_URL");

        let raw_public_url =
            var("SPECD_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
        let public_url = Url::parse(&raw_public_url)
            .with_context(|| format!("SPECD_PUBLIC_URL is invalid: {}", raw_public_url))?;

        let default_size = parse_number(&var, "SPECD_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_size = parse_number(&var, "SPECD_MAX_PAGE_SIZE", MAX_PAGE_SIZE)?;
        if default_size == 0 || default_size > max_size {
            return Err(anyhow!(
                "SPECD_DEFAULT_PAGE_SIZE must be between 1 and SPECD_MAX_PAGE_SIZE ({})",
                max_size
            ));
        }

        let timeout_secs = parse_number(&var, "SPECD_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(anyhow!("SPECD_REQUEST_TIMEOUT must be at least 1 second"));
        }

        let scheduler_queue =
            parse_number(&var, "SPECD_SCHEDULER_QUEUE", DEFAULT_SCHEDULER_QUEUE)?;

        let bridges = match var("SPECD_BRIDGES") {
            Some(raw) => parse_bridges(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            bind_addr,
            database_url,
            public_url,
            page_limits: PageLimits {
                default_size,
                max_size,
            },
            request_timeout: Duration::from_secs(timeout_secs as u64),
            scheduler_queue,
            bridges,
        })
    }
}

fn parse_number(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> anyhow::Result<usize> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, raw)),
        None => Ok(default),
    }
}

/// Parse `name=url,name=url`
fn parse_bridges(raw: &str) -> anyhow::Result<Vec<Bridge>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("SPECD_BRIDGES entry {:?} is not name=url", entry))?;
            if name.trim().is_empty() {
                return Err(anyhow!("SPECD_BRIDGES entry {:?} has an empty name", entry));
            }
            let url = Url::parse(url.trim())
                .with_context(|| format!("SPECD_BRIDGES entry {:?} has an invalid URL", entry))?;
            Ok(Bridge::new(name, url))
        })
        .collect()
}
