//! The record data model shared by consultations and surveys
//!
//! Both record kinds carry the exact same shape; they differ only in the
//! collection and wire id field configured by [`ResourceKind`](crate::core::resource::ResourceKind).
//!
//! Timestamp handling is explicit: `Record::create` stamps both timestamps
//! and `UpdateRecord::apply` calls [`Record::touch`] after merging. There is
//! no implicit pre-save hook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Wire/storage encoding for timestamps: RFC 3339 with fixed microsecond
/// precision. Chrono's default encoding varies the fractional digits per
/// value, which breaks lexicographic sorting of the stored strings; a fixed
/// width keeps string order identical to timestamp order.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// The fixed set of question types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    CheckboxList,
    ShortText,
    LongText,
}

/// A question embedded in a record
///
/// Questions are not independently addressable. The position in the
/// `questions` array is authoritative for display order; the `order` field is
/// caller-supplied metadata and is never re-sorted by the server. `id` is
/// caller-supplied and its uniqueness is not enforced. `options` is only
/// meaningful for choice-type questions but is not validated against `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub text: String,

    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub required: bool,

    pub order: i64,
}

/// A persisted consultation/survey record
///
/// `id` is generated server-side at creation and is the sole external lookup
/// key. `created_by` holds the verified caller's subject id and is never
/// taken from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub created_by: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Build a fresh record from validated input: generates the external id
    /// and stamps both timestamps.
    pub fn create(new: NewRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            questions: new.questions,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`. Called explicitly on every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Project to the list view: `updated_at` and `created_by` are
    /// intentionally omitted.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            questions: self.questions.clone(),
        }
    }
}

/// Creation input assembled by the router: body fields plus the verified
/// caller identity.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub created_by: String,
}

/// Request body for creating a record
///
/// `title` and `questions` are required; a missing field or a non-array
/// `questions` fails deserialization and surfaces as a validation error.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecord {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(nested)]
    pub questions: Vec<Question>,
}

impl CreateRecord {
    /// Attach the verified owner to the request body.
    pub fn with_owner(self, created_by: impl Into<String>) -> NewRecord {
        NewRecord {
            title: self.title,
            description: self.description,
            questions: self.questions,
            created_by: created_by.into(),
        }
    }
}

/// Request body for updating a record
///
/// Shallow merge semantics: fields left out of the request are untouched.
/// A JSON `null` deserializes the same as an absent field, so a description
/// can be replaced but never cleared through this API.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRecord {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(nested)]
    pub questions: Option<Vec<Question>>,
}

impl UpdateRecord {
    /// Merge the provided fields onto an existing record and refresh
    /// `updated_at`.
    pub fn apply(self, record: &mut Record) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(questions) = self.questions {
            record.questions = questions;
        }
        record.touch();
    }
}

/// List projection of a record (id, title, description, createdAt, questions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}
