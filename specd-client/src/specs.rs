//! Job spec endpoints

use specd_core::dto::job_spec::CreateJobSpec;
use specd_core::pagination::Envelope;
use specd_core::presenter::JobSpecResource;
use uuid::Uuid;

use crate::SpecdClient;
use crate::error::Result;

impl SpecdClient {
    /// List one page of job specs.
    ///
    /// Omitted parameters fall back to the server's defaults.
    pub async fn list_specs(
        &self,
        size: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Envelope<JobSpecResource>> {
        let url = format!("{}/specs", self.base_url);
        let mut query = Vec::new();
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        tracing::debug!("GET {} {:?}", url, query);
        let response = self.client.get(&url).query(&query).send().await?;

        self.handle_response(response).await
    }

    /// Fetch a page by the absolute URL from a `links.next` or `links.prev`
    pub async fn list_specs_at(&self, page_url: &str) -> Result<Envelope<JobSpecResource>> {
        tracing::debug!("GET {}", page_url);
        let response = self.client.get(page_url).send().await?;

        self.handle_response(response).await
    }

    /// Submit a new job spec; the server validates, saves and schedules it
    pub async fn create_spec(&self, spec: &CreateJobSpec) -> Result<JobSpecResource> {
        let url = format!("{}/specs", self.base_url);
        let response = self.client.post(&url).json(spec).send().await?;

        self.handle_response(response).await
    }

    /// Get a job spec together with its runs
    pub async fn get_spec(&self, id: Uuid) -> Result<JobSpecResource> {
        let url = format!("{}/specs/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
