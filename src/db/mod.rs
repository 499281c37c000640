//! Document storage
//!
//! Services talk to a [`DocumentCollection`], implemented by MongoDB in
//! production and by an in-process BSON store for development and tests.

pub mod collection;
pub mod json;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod schemas;
pub mod store;

pub use collection::{DocumentCollection, IntoIndexes, Record};
pub use json::{bson_to_json, to_api_json};
pub use memory::MemoryCollection;
pub use mongo::{MongoClient, MongoCollection};
pub use store::{Collections, StoreBackend};
