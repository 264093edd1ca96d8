//! Storage backends implementing the record store contract

pub mod in_memory;
pub mod mongodb;

pub use in_memory::InMemoryRecordStore;
pub use mongodb::MongoRecordStore;
