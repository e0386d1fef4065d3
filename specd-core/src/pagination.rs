//! Pagination
//!
//! Parses `size`/`offset` query parameters into a [`PaginationCursor`] and
//! builds the [`Envelope`] returned by listing endpoints.
//!
//! The envelope's `meta.count` and its `data` page come from two separate
//! store reads. Under concurrent writes they may disagree slightly: a spec
//! admitted between the two reads can show up in the page without being
//! counted, or the count can include a spec the page no longer reaches.
//! Clients should treat `count` and the links as hints, not a snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::error::ErrorKind;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 100;

/// Bounds applied when parsing a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Size used when the request does not give one
    pub default_size: usize,
    /// Largest size a request may ask for
    pub max_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Requested page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub size: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("invalid {param} param \"{value}\": {reason}")]
    InvalidArgument {
        param: &'static str,
        value: String,
        reason: String,
    },
}

impl PaginationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }

    /// Name of the offending query parameter
    pub fn param(&self) -> &'static str {
        match self {
            PaginationError::InvalidArgument { param, .. } => param,
        }
    }
}

/// Parse raw query parameter values into a cursor.
///
/// Absent or empty values fall back to `limits.default_size` and offset 0.
pub fn parse(
    size: Option<&str>,
    offset: Option<&str>,
    limits: &PageLimits,
) -> Result<PaginationCursor, PaginationError> {
    let size = match size.filter(|s| !s.is_empty()) {
        None => limits.default_size,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=limits.max_size).contains(&n) => n,
            _ => {
                return Err(PaginationError::InvalidArgument {
                    param: "size",
                    value: raw.to_string(),
                    reason: format!("must be an integer between 1 and {}", limits.max_size),
                });
            }
        },
    };

    let offset = match offset.filter(|s| !s.is_empty()) {
        None => 0,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| PaginationError::InvalidArgument {
                param: "offset",
                value: raw.to_string(),
                reason: "must be a non-negative integer".to_string(),
            })?,
    };

    Ok(PaginationCursor { size, offset })
}

/// Paginated response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of items at the time of the count read
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prev: Option<String>,
}

/// Assemble the envelope for one page.
///
/// Links are copies of `base_url` with `size` and `offset` replaced; any other
/// query parameters are kept in their original order.
pub fn build_envelope<T>(
    base_url: &Url,
    cursor: PaginationCursor,
    total_count: u64,
    items: Vec<T>,
) -> Envelope<T> {
    let PaginationCursor { size, offset } = cursor;

    let next = ((offset as u64).saturating_add(size as u64) < total_count)
        .then(|| page_url(base_url, size, offset + size));
    let prev = (offset > 0).then(|| page_url(base_url, size, offset.saturating_sub(size)));

    Envelope {
        data: items,
        meta: PageMeta { count: total_count },
        links: PageLinks { next, prev },
    }
}

fn page_url(base_url: &Url, size: usize, offset: usize) -> String {
    let kept: Vec<(String, String)> = base_url
        .query_pairs()
        .filter(|(k, _)| k != "size" && k != "offset")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("size", &size.to_string())
        .append_pair("offset", &offset.to_string());
    url.to_string()
}
