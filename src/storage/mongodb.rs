//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Storage model
//!
//! Collection-per-record-kind: `MongoRecordStore` dispatches on the
//! [`ResourceKind`] and operates on the collection it names
//! ("consultations", "surveys").
//!
//! Documents are keyed by the kind's external id field (`consultationId` /
//! `surveyId`). MongoDB's own `_id` is left to the driver and never exposed;
//! the external id is not the storage row id.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs are stored as strings and
//! timestamps as RFC 3339 strings with a fixed microsecond width, so the
//! driver's lexicographic string sort on `createdAt` matches timestamp
//! order.

use crate::config::MongoConfig;
use crate::core::record::{NewRecord, Record, RecordSummary, UpdateRecord};
use crate::core::resource::ResourceKind;
use crate::core::store::{RecordStore, StoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Connect to MongoDB and ping the deployment.
///
/// A failed connection or ping is fatal at startup; callers propagate the
/// error and exit.
pub async fn connect(config: &MongoConfig) -> Result<(Client, Database)> {
    let uri = config.connection_uri();
    let client = Client::with_uri_str(&uri)
        .await
        .context("failed to build MongoDB client")?;
    let database = client.database(&config.database);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("failed to ping MongoDB deployment")?;

    tracing::info!(database = %config.database, "connected to MongoDB");
    Ok((client, database))
}

/// Convert a serde_json::Value (expected to be an Object) into a BSON
/// Document. The value is already externalized, so the record id sits under
/// the kind-specific field.
fn json_to_document(kind: &ResourceKind, json: serde_json::Value) -> Result<Document, StoreError> {
    let bson = mongodb::bson::to_bson(&json).map_err(|e| StoreError::serialization(kind, e))?;

    match bson {
        Bson::Document(doc) => Ok(doc),
        _ => Err(StoreError::Serialization {
            kind: kind.singular,
            message: "expected a BSON document, got a non-object".to_string(),
        }),
    }
}

/// Convert a BSON Document back into a typed value, dropping the
/// storage-internal `_id` and renaming the kind id field back to `id`.
fn document_to<T: DeserializeOwned>(kind: &ResourceKind, mut doc: Document) -> Result<T, StoreError> {
    doc.remove("_id");
    let json = Bson::Document(doc).into_relaxed_extjson();
    kind.internalize(json)
        .map_err(|e| StoreError::serialization(kind, e))
}

/// Record store backed by MongoDB
#[derive(Clone, Debug)]
pub struct MongoRecordStore {
    database: Database,
}

impl MongoRecordStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, kind: &ResourceKind) -> mongodb::Collection<Document> {
        self.database.collection(kind.collection)
    }

    fn id_filter(kind: &ResourceKind, id: &Uuid) -> Document {
        doc! { kind.id_field: id.to_string() }
    }

    fn record_to_document(kind: &ResourceKind, record: &Record) -> Result<Document, StoreError> {
        let json = kind
            .externalize(record)
            .map_err(|e| StoreError::serialization(kind, e))?;
        json_to_document(kind, json)
    }

    /// Create indexes for every record kind. Idempotent, called at startup.
    ///
    /// Each collection gets a unique index on its external id field and a
    /// compound index supporting the owner listing (filter by `createdBy`,
    /// sort by `createdAt` descending).
    pub async fn ensure_indexes(&self, kinds: &[ResourceKind]) -> Result<()> {
        for kind in kinds {
            let indexes = vec![
                IndexModel::builder()
                    .keys(doc! { kind.id_field: 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "createdBy": 1, "createdAt": -1 })
                    .build(),
            ];

            self.collection(kind)
                .create_indexes(indexes)
                .await
                .with_context(|| format!("failed to create indexes on '{}'", kind.collection))?;
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    /// Insert a new record into the kind's collection.
    async fn create(&self, kind: &ResourceKind, new: NewRecord) -> Result<Record, StoreError> {
        let record = Record::create(new);
        let doc = Self::record_to_document(kind, &record)?;

        self.collection(kind)
            .insert_one(doc)
            .await
            .map_err(|e| StoreError::backend(kind, "create", e))?;

        Ok(record)
    }

    /// Owner-filtered listing, newest first, projected to the summary view.
    async fn list_by_owner(
        &self,
        kind: &ResourceKind,
        owner: &str,
    ) -> Result<Vec<RecordSummary>, StoreError> {
        let cursor = self
            .collection(kind)
            .find(doc! { "createdBy": owner })
            .sort(doc! { "createdAt": -1 })
            .projection(doc! {
                "_id": 0,
                kind.id_field: 1,
                "title": 1,
                "description": 1,
                "createdAt": 1,
                "questions": 1,
            })
            .await
            .map_err(|e| StoreError::backend(kind, "list", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::backend(kind, "list", e))?;

        docs.into_iter()
            .map(|doc| document_to::<RecordSummary>(kind, doc))
            .collect()
    }

    /// Fetch a record by its external id.
    async fn get_by_id(&self, kind: &ResourceKind, id: &Uuid) -> Result<Record, StoreError> {
        let doc = self
            .collection(kind)
            .find_one(Self::id_filter(kind, id))
            .await
            .map_err(|e| StoreError::backend(kind, "get", e))?
            .ok_or_else(|| StoreError::not_found(kind, id))?;

        document_to(kind, doc)
    }

    /// Read-merge-write update: fetch the document, apply the shallow merge
    /// and timestamp refresh, then replace it. A concurrent delete between
    /// the read and the replace surfaces as not-found.
    async fn update(
        &self,
        kind: &ResourceKind,
        id: &Uuid,
        patch: UpdateRecord,
    ) -> Result<Record, StoreError> {
        let mut record = self.get_by_id(kind, id).await?;
        patch.apply(&mut record);

        let doc = Self::record_to_document(kind, &record)?;
        let result = self
            .collection(kind)
            .replace_one(Self::id_filter(kind, id), doc)
            .await
            .map_err(|e| StoreError::backend(kind, "update", e))?;

        if result.matched_count == 0 {
            return Err(StoreError::not_found(kind, id));
        }

        Ok(record)
    }

    /// Hard delete by external id.
    async fn delete(&self, kind: &ResourceKind, id: &Uuid) -> Result<(), StoreError> {
        let result = self
            .collection(kind)
            .delete_one(Self::id_filter(kind, id))
            .await
            .map_err(|e| StoreError::backend(kind, "delete", e))?;

        if result.deleted_count == 0 {
            return Err(StoreError::not_found(kind, id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Question, QuestionKind};
    use crate::core::resource::{CONSULTATION, SURVEY};
    use serde_json::json;

    fn sample_record() -> Record {
        Record::create(NewRecord {
            title: "T1".to_string(),
            description: Some("d".to_string()),
            questions: vec![Question {
                id: 1,
                kind: QuestionKind::MultipleChoice,
                text: "Pick one".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                required: true,
                order: 1,
            }],
            created_by: "alice".to_string(),
        })
    }

    #[test]
    fn record_document_uses_kind_id_field() {
        let record = sample_record();
        let doc = MongoRecordStore::record_to_document(&CONSULTATION, &record).unwrap();

        assert_eq!(
            doc.get_str("consultationId").unwrap(),
            record.id.to_string()
        );
        assert!(!doc.contains_key("id"));
        assert_eq!(doc.get_str("createdBy").unwrap(), "alice");
    }

    #[test]
    fn document_round_trips_to_record() {
        let record = sample_record();
        let doc = MongoRecordStore::record_to_document(&SURVEY, &record).unwrap();

        let back: Record = document_to(&SURVEY, doc).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.title, record.title);
        assert_eq!(back.questions, record.questions);
        assert_eq!(back.created_by, record.created_by);
    }

    #[test]
    fn document_to_drops_storage_id() {
        let record = sample_record();
        let mut doc = MongoRecordStore::record_to_document(&SURVEY, &record).unwrap();
        doc.insert("_id", mongodb::bson::oid::ObjectId::new());

        let back: Record = document_to(&SURVEY, doc).unwrap();
        assert_eq!(back.id, record.id);
    }

    #[test]
    fn stored_timestamps_sort_lexicographically_in_time_order() {
        use chrono::DateTime;

        // An exactly-millisecond timestamp and a later one with trailing
        // nanoseconds: under a variable-width encoding the earlier string
        // would compare greater and a descending sort would return the
        // older record first.
        let mut earlier = sample_record();
        earlier.created_at = DateTime::from_timestamp(1_000_000, 123_000_000).unwrap();
        let mut later = sample_record();
        later.created_at = DateTime::from_timestamp(1_000_000, 123_456_789).unwrap();

        let earlier_doc = MongoRecordStore::record_to_document(&CONSULTATION, &earlier).unwrap();
        let later_doc = MongoRecordStore::record_to_document(&CONSULTATION, &later).unwrap();

        let earlier_at = earlier_doc.get_str("createdAt").unwrap();
        let later_at = later_doc.get_str("createdAt").unwrap();

        assert_eq!(earlier_at.len(), later_at.len());
        assert!(earlier_at < later_at);

        // Sub-microsecond differences collapse to the same encoding; they
        // must never invert the order.
        let mut barely_later = sample_record();
        barely_later.created_at = DateTime::from_timestamp(1_000_000, 123_000_001).unwrap();
        let barely_later_doc =
            MongoRecordStore::record_to_document(&CONSULTATION, &barely_later).unwrap();
        assert!(earlier_at <= barely_later_doc.get_str("createdAt").unwrap());
    }

    #[test]
    fn json_to_document_rejects_non_object() {
        let result = json_to_document(&CONSULTATION, json!("not a document"));
        assert!(result.is_err());
    }

    #[test]
    fn id_filter_uses_external_id_string() {
        let id = Uuid::new_v4();
        let filter = MongoRecordStore::id_filter(&CONSULTATION, &id);
        assert_eq!(
            filter.get_str("consultationId").unwrap(),
            id.to_string()
        );
    }

    #[test]
    fn summary_document_parses_without_owner_fields() {
        // Matches the shape the list projection produces.
        let record = sample_record();
        let doc = doc! {
            "surveyId": record.id.to_string(),
            "title": "T1",
            "description": "d",
            "createdAt": record.created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "questions": [],
        };

        let summary: RecordSummary = document_to(&SURVEY, doc).unwrap();
        assert_eq!(summary.id, record.id);
        assert_eq!(summary.title, "T1");
    }
}
