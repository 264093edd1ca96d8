//! # Consulta
//!
//! REST backend for consultation and survey records.
//!
//! Authenticated users create, list, fetch, update, and delete records made
//! of a title, an optional description, and an ordered list of questions.
//! Identity is verified against an external token service; records live in
//! MongoDB. The two record kinds ("consultation" and "survey") share one
//! generic resource implementation parameterized by a [`core::resource::ResourceKind`].
//!
//! ## Layout
//!
//! - [`core`] — data model, resource configuration, store contract, identity
//!   verification, error taxonomy
//! - [`storage`] — MongoDB backend plus an in-memory backend for tests
//! - [`server`] — axum router, extractors, and handlers
//! - [`config`] — environment-based configuration

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::config::{Config, MongoConfig};
    pub use crate::core::{
        ApiError, AuthError, CreateRecord, HttpTokenVerifier, Identity, NewRecord, Question,
        QuestionKind, Record, RecordStore, RecordSummary, ResourceKind, StaticTokenVerifier,
        StoreError, TokenVerifier, UpdateRecord, CONSULTATION, KINDS, SURVEY,
    };
    pub use crate::server::{AppState, build_router};
    pub use crate::storage::{InMemoryRecordStore, MongoRecordStore};
}
