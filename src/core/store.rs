//! Record store contract
//!
//! Implementations provide the document operations behind the REST handlers.
//! The store performs no authorization checks; ownership filtering happens in
//! `list_by_owner` only, and the router decides what a caller may reach.

use crate::core::record::{NewRecord, Record, RecordSummary, UpdateRecord};
use crate::core::resource::ResourceKind;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by store operations
///
/// Messages carry the failed operation so they stay meaningful once
/// flattened into an HTTP error body.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with id '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("failed to {operation} {kind}: {message}")]
    Backend {
        kind: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("failed to serialize {kind}: {message}")]
    Serialization {
        kind: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn not_found(kind: &ResourceKind, id: &Uuid) -> Self {
        StoreError::NotFound {
            kind: kind.singular,
            id: id.to_string(),
        }
    }

    pub fn backend(
        kind: &ResourceKind,
        operation: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        StoreError::Backend {
            kind: kind.singular,
            operation,
            message: err.to_string(),
        }
    }

    pub fn serialization(kind: &ResourceKind, err: impl std::fmt::Display) -> Self {
        StoreError::Serialization {
            kind: kind.singular,
            message: err.to_string(),
        }
    }

    /// True for the missing-record case, false for backend failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Document operations for the record resource
///
/// The same implementation serves consultations and surveys, dispatching on
/// the [`ResourceKind`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record. Generates the external id and stamps both
    /// timestamps. Returns the persisted record.
    async fn create(&self, kind: &ResourceKind, new: NewRecord) -> Result<Record, StoreError>;

    /// All records owned by `owner`, projected to the list view, newest
    /// `created_at` first. Zero matches is an empty vec, never an error.
    async fn list_by_owner(
        &self,
        kind: &ResourceKind,
        owner: &str,
    ) -> Result<Vec<RecordSummary>, StoreError>;

    /// Fetch the full record for an external id.
    async fn get_by_id(&self, kind: &ResourceKind, id: &Uuid) -> Result<Record, StoreError>;

    /// Shallow-merge the provided fields onto the stored record, refresh
    /// `updated_at`, and return the updated record.
    async fn update(
        &self,
        kind: &ResourceKind,
        id: &Uuid,
        patch: UpdateRecord,
    ) -> Result<Record, StoreError>;

    /// Remove the record permanently. No tombstone, no cascade.
    async fn delete(&self, kind: &ResourceKind, id: &Uuid) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::CONSULTATION;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let id = Uuid::new_v4();
        let err = StoreError::not_found(&CONSULTATION, &id);
        let msg = err.to_string();
        assert!(msg.contains("consultation"));
        assert!(msg.contains(&id.to_string()));
        assert!(err.is_not_found());
    }

    #[test]
    fn backend_message_names_operation() {
        let err = StoreError::backend(&CONSULTATION, "create", "connection reset");
        assert_eq!(
            err.to_string(),
            "failed to create consultation: connection reset"
        );
        assert!(!err.is_not_found());
    }
}
