//! ID resolver module
//!
//! Resolves UUID prefixes to full UUIDs by paging through the job spec list,
//! so users can type short, unambiguous prefixes instead of full UUIDs.

use anyhow::{Context, Result, anyhow};
use specd_client::{JobSpecResource, SpecdClient};
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Page size used when walking the whole list
const WALK_PAGE_SIZE: usize = 100;

/// Fetch every job spec by following `links.next` from the first page
pub async fn fetch_all_specs(client: &SpecdClient) -> Result<Vec<JobSpecResource>> {
    let mut page = client
        .list_specs(Some(WALK_PAGE_SIZE), Some(0))
        .await
        .context("Failed to fetch job specs")?;
    let mut specs = std::mem::take(&mut page.data);

    while let Some(next) = page.links.next.take() {
        page = client
            .list_specs_at(&next)
            .await
            .with_context(|| format!("Failed to fetch page {}", next))?;
        specs.append(&mut page.data);
    }

    Ok(specs)
}

/// Resolve a job spec ID or prefix to a full UUID
///
/// A full UUID is returned as-is without contacting the server.
pub async fn resolve_spec_id(client: &SpecdClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let specs = fetch_all_specs(client)
        .await
        .context("Failed to fetch job specs for ID resolution")?;
    match_prefix(specs.iter().map(|s| s.id), &id_or_prefix.to_string())
}

fn match_prefix(ids: impl Iterator<Item = Uuid>, prefix: &str) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids.filter(|id| id.to_string().starts_with(prefix)).collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job spec found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple job specs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
