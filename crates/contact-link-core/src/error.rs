//! Error taxonomy for identity resolution and lookup.

use std::error::Error as StdError;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type returned by [`ContactStore`](crate::store::ContactStore) methods.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type returned by the resolver and query service.
pub type ContactResult<T> = Result<T, ContactError>;

/// A failure inside a storage backend.
///
/// Carries the name of the failed operation so logs read
/// `insert contact: database is locked` rather than a bare driver message.
#[derive(Debug, Error)]
#[error("{op}: {source}")]
pub struct StoreError {
    op: &'static str,
    #[source]
    source: BoxError,
}

impl StoreError {
    pub fn new(op: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            op,
            source: source.into(),
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}

/// Errors surfaced to callers of the resolver and query service.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The caller did not supply the identifying signal(s) required.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A lookup matched no rows.
    #[error("no contact found")]
    NotFound,

    /// A concurrent writer won a race the resolver could not recover from.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ContactError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_includes_op() {
        let err = StoreError::new("insert contact", "disk full");
        assert_eq!(err.to_string(), "insert contact: disk full");
        assert_eq!(err.op(), "insert contact");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_storage_error_converts() {
        let err: ContactError = StoreError::new("find by email", "locked").into();
        assert!(matches!(err, ContactError::Storage(_)));
        assert_eq!(err.to_string(), "storage error: find by email: locked");
    }
}
