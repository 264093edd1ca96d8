//! Core types: data model, resource configuration, store contract,
//! identity verification, and the error taxonomy

pub mod auth;
pub mod error;
pub mod record;
pub mod resource;
pub mod store;

pub use auth::{AuthError, HttpTokenVerifier, Identity, StaticTokenVerifier, TokenVerifier};
pub use error::{ApiError, ErrorResponse};
pub use record::{CreateRecord, NewRecord, Question, QuestionKind, Record, RecordSummary, UpdateRecord};
pub use resource::{CONSULTATION, KINDS, ResourceKind, SURVEY};
pub use store::{RecordStore, StoreError};
