//! Error types for user record storage
//!
//! These cover the failure modes any [`UserStore`](super::UserStore)
//! implementation can surface; implementation-specific detail goes in the
//! `reason` fields rather than new variants.

use thiserror::Error;

/// Errors that can occur during store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected an insert or update.
    #[error("Duplicate value for unique index '{index}': {value}")]
    DuplicateKey {
        /// Name of the violated index (`identifier`, `username`, or `api_key`)
        index: &'static str,
        /// The duplicated value
        value: String,
    },

    /// The store could not complete a transaction.
    ///
    /// Covers I/O failure and lock poisoning. Callers may retry idempotent
    /// operations; the store itself never retries.
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A record could not be serialized for storage.
    #[error("Record serialization failed: {reason}")]
    SerializationFailed { reason: String },

    /// A stored record could not be deserialized.
    #[error("Record deserialization failed: {reason}")]
    DeserializationFailed { reason: String },

    /// A loaded snapshot violates a store invariant.
    #[error("Store corruption detected: {reason}")]
    Corruption { reason: String },
}

impl StoreError {
    /// Check if this error is a unique-index violation.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    /// Check if this error indicates the store could not complete a
    /// transaction.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Check if this error is related to record marshaling.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. } | StoreError::DeserializationFailed { .. }
        )
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, StoreError::Corruption { .. })
    }

    /// The violated index name, for duplicate-key errors.
    pub fn duplicate_index(&self) -> Option<&'static str> {
        match self {
            StoreError::DuplicateKey { index, .. } => Some(index),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
