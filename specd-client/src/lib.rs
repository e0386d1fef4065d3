//! specd HTTP Client
//!
//! A small, type-safe client for the job spec API.
//!
//! # Example
//!
//! ```no_run
//! use specd_client::SpecdClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpecdClient::new("http://localhost:8080");
//!
//!     let page = client.list_specs(Some(10), None).await?;
//!     println!("{} job specs", page.meta.count);
//!     Ok(())
//! }
//! ```

pub mod error;
mod specs;

pub use error::{ClientError, Result};
pub use specd_core::pagination::Envelope;
pub use specd_core::presenter::JobSpecResource;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the job spec API
#[derive(Debug, Clone)]
pub struct SpecdClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    client: Client,
}

impl SpecdClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client around a configured reqwest Client (timeouts, proxies, TLS)
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the status code and deserialize the JSON body.
    ///
    /// Non-success responses become [`ClientError::Api`] carrying the
    /// messages from the `errors` array.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_body(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
