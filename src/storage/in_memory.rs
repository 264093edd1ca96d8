//! In-memory implementation of RecordStore for testing and development

use crate::core::record::{NewRecord, Record, RecordSummary, UpdateRecord};
use crate::core::resource::ResourceKind;
use crate::core::store::{RecordStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Collections = HashMap<&'static str, HashMap<Uuid, Record>>;

/// In-memory record store
///
/// Keeps one map per collection behind an RwLock. Thread-safe and cheap to
/// clone; used by the test suite and for local development.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections.read().map_err(|e| StoreError::Backend {
            kind: "record",
            operation: "lock",
            message: e.to_string(),
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections.write().map_err(|e| StoreError::Backend {
            kind: "record",
            operation: "lock",
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, kind: &ResourceKind, new: NewRecord) -> Result<Record, StoreError> {
        let record = Record::create(new);

        let mut collections = self.write()?;
        collections
            .entry(kind.collection)
            .or_default()
            .insert(record.id, record.clone());

        Ok(record)
    }

    async fn list_by_owner(
        &self,
        kind: &ResourceKind,
        owner: &str,
    ) -> Result<Vec<RecordSummary>, StoreError> {
        let collections = self.read()?;

        let mut records: Vec<&Record> = collections
            .get(kind.collection)
            .map(|records| records.values().filter(|r| r.created_by == owner).collect())
            .unwrap_or_default();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records.into_iter().map(Record::summary).collect())
    }

    async fn get_by_id(&self, kind: &ResourceKind, id: &Uuid) -> Result<Record, StoreError> {
        let collections = self.read()?;

        collections
            .get(kind.collection)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    async fn update(
        &self,
        kind: &ResourceKind,
        id: &Uuid,
        patch: UpdateRecord,
    ) -> Result<Record, StoreError> {
        let mut collections = self.write()?;

        let record = collections
            .get_mut(kind.collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;

        patch.apply(record);

        Ok(record.clone())
    }

    async fn delete(&self, kind: &ResourceKind, id: &Uuid) -> Result<(), StoreError> {
        let mut collections = self.write()?;

        collections
            .get_mut(kind.collection)
            .and_then(|records| records.remove(id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;

        Ok(())
    }
}
