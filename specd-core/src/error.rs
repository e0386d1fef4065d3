//! Error classification shared by every specd layer

use serde::{Deserialize, Serialize};

/// Coarse category of a failure.
///
/// Layers keep their own error enums; `kind()` on each maps into this set so
/// that propagation policy and HTTP status selection stay in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed client input (query parameters, request body)
    InvalidArgument,
    /// A candidate spec failed validation
    Validation,
    /// No entity with the requested ID
    NotFound,
    /// The backing store could not be read or written
    StoreUnavailable,
    /// A record with the same ID already exists
    Conflict,
    /// The request did not finish within its time budget
    Timeout,
    /// The spec was persisted but the scheduler refused it
    SchedulingFailed,
}

impl ErrorKind {
    /// Whether the caller can fix the failure by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidArgument | ErrorKind::Validation | ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(ErrorKind::InvalidArgument.is_client_error());
        assert!(ErrorKind::NotFound.is_client_error());
        assert!(!ErrorKind::Conflict.is_client_error());
        assert!(!ErrorKind::Timeout.is_client_error());
    }
}
