//! In-memory document collection
//!
//! Holds BSON documents in insertion order behind a lock, evaluating
//! filters and updates with [`crate::db::query`]. Each trait method takes
//! the lock once, so single-document updates are atomic exactly as they
//! are on the server. Used in dev mode and by tests.

use std::marker::PhantomData;

use bson::Document;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::collection::{prepare_insert, touch, DocumentCollection, Record};
use crate::db::query::{apply_update, matches, sort_documents};
use crate::types::Result;

/// In-memory implementation of [`DocumentCollection`]
pub struct MemoryCollection<T> {
    name: String,
    docs: RwLock<Vec<Document>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> MemoryCollection<T> {
    /// Create an empty collection
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            docs: RwLock::new(Vec::new()),
            _marker: PhantomData,
        }
    }

    fn decode(doc: Document) -> Result<T> {
        Ok(bson::from_document(doc)?)
    }
}

#[async_trait::async_trait]
impl<T: Record> DocumentCollection<T> for MemoryCollection<T> {
    async fn find(&self, filter: Document, sort: Option<Document>) -> Result<Vec<T>> {
        let mut found: Vec<Document> = {
            let docs = self.docs.read().await;
            docs.iter().filter(|d| matches(d, &filter)).cloned().collect()
        };

        if let Some(order) = sort {
            sort_documents(&mut found, &order);
        }

        found.into_iter().map(Self::decode).collect()
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let docs = self.docs.read().await;
        docs.iter()
            .find(|d| matches(d, &filter))
            .cloned()
            .map(Self::decode)
            .transpose()
    }

    async fn insert_one(&self, item: T) -> Result<T> {
        let item = prepare_insert(item);
        let doc = bson::to_document(&item)?;

        self.docs.write().await.push(doc);
        debug!("Inserted into in-memory collection '{}'", self.name);

        Ok(item)
    }

    async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<T>> {
        let update = touch(update);
        let mut docs = self.docs.write().await;

        let Some(doc) = docs.iter_mut().find(|d| matches(d, &filter)) else {
            return Ok(None);
        };

        // Work on a copy so a failing operator leaves the stored document intact
        let mut updated = doc.clone();
        apply_update(&mut updated, &filter, &update)?;
        let decoded = Self::decode(updated.clone())?;
        *doc = updated;

        Ok(Some(decoded))
    }

    async fn delete_one(&self, filter: Document) -> Result<bool> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self, filter: Document) -> Result<u64> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| matches(d, &filter)).count() as u64)
    }
}
