//! Resource kind configuration
//!
//! Consultations and surveys share one generic resource implementation; a
//! [`ResourceKind`] carries the per-kind configuration: route namespace,
//! storage collection, and the wire name of the external id field.
//!
//! Internally every record uses a plain `id` field. At the wire and storage
//! boundaries that field is renamed to the kind-specific name
//! (`consultationId` / `surveyId`), in the same way `id` is renamed to
//! MongoDB's `_id` in document stores. The external id is never the
//! storage-internal row id.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Per-kind configuration for the generic record resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Singular name, used in messages and response envelopes ("consultation")
    pub singular: &'static str,
    /// Plural name, used as the route segment ("consultations")
    pub plural: &'static str,
    /// Storage collection name
    pub collection: &'static str,
    /// Wire/storage name of the external id field ("consultationId")
    pub id_field: &'static str,
}

/// The consultation resource
pub const CONSULTATION: ResourceKind = ResourceKind {
    singular: "consultation",
    plural: "consultations",
    collection: "consultations",
    id_field: "consultationId",
};

/// The survey resource
pub const SURVEY: ResourceKind = ResourceKind {
    singular: "survey",
    plural: "surveys",
    collection: "surveys",
    id_field: "surveyId",
};

/// All record kinds served by this backend
pub static KINDS: [ResourceKind; 2] = [CONSULTATION, SURVEY];

impl ResourceKind {
    /// Look up a kind by its plural route segment.
    pub fn resolve(plural: &str) -> Option<&'static ResourceKind> {
        KINDS.iter().find(|kind| kind.plural == plural)
    }

    /// Serialize a value for the wire, renaming `id` to the kind-specific
    /// id field.
    pub fn externalize<T: Serialize>(&self, value: &T) -> Result<Value, serde_json::Error> {
        let mut json = serde_json::to_value(value)?;
        if let Value::Object(map) = &mut json
            && let Some(id) = map.remove("id")
        {
            map.insert(self.id_field.to_string(), id);
        }
        Ok(json)
    }

    /// Parse a wire/storage payload, renaming the kind-specific id field
    /// back to `id`.
    pub fn internalize<T: DeserializeOwned>(
        &self,
        mut json: Value,
    ) -> Result<T, serde_json::Error> {
        if let Value::Object(map) = &mut json
            && let Some(id) = map.remove(self.id_field)
        {
            map.insert("id".to_string(), id);
        }
        serde_json::from_value(json)
    }
}
