//! Collection abstraction shared by the MongoDB and in-memory stores

use bson::{oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{de::DeserializeOwned, Serialize};

use crate::types::Result;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// A top-level document type stored in its own collection
pub trait Record:
    Serialize + DeserializeOwned + Unpin + Send + Sync + Clone + IntoIndexes + 'static
{
    /// Document `_id`, if one has been assigned
    fn id(&self) -> Option<ObjectId>;

    /// Assign the `_id` before insertion
    fn assign_id(&mut self, id: ObjectId);

    /// Set both `createdAt` and `updatedAt`
    fn stamp_created(&mut self, now: DateTime);
}

/// Storage operations the services are written against.
///
/// Each method is a single atomic operation on the underlying store.
#[async_trait::async_trait]
pub trait DocumentCollection<T: Record>: Send + Sync {
    /// Find all documents matching `filter`, optionally sorted
    async fn find(&self, filter: Document, sort: Option<Document>) -> Result<Vec<T>>;

    /// Find the first document matching `filter`
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;

    /// Insert a document, assigning `_id` and timestamps. Returns the stored form.
    async fn insert_one(&self, item: T) -> Result<T>;

    /// Apply `update` to the first document matching `filter` and return it
    /// as it is after the update. `updatedAt` is always refreshed.
    async fn find_one_and_update(&self, filter: Document, update: Document)
        -> Result<Option<T>>;

    /// Delete the first document matching `filter`; true if one was removed
    async fn delete_one(&self, filter: Document) -> Result<bool>;

    /// Count documents matching `filter`
    async fn count(&self, filter: Document) -> Result<u64>;
}

/// Give a new record its `_id` and creation timestamps
pub(crate) fn prepare_insert<T: Record>(mut item: T) -> T {
    if item.id().is_none() {
        item.assign_id(ObjectId::new());
    }
    item.stamp_created(DateTime::now());
    item
}

/// Add `updatedAt = now` to the `$set` stage of an update
pub(crate) fn touch(mut update: Document) -> Document {
    let now = DateTime::now();
    match update.get_document_mut("$set") {
        Ok(set) => {
            set.insert("updatedAt", now);
        }
        Err(_) => {
            update.insert("$set", bson::doc! { "updatedAt": now });
        }
    }
    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_touch_adds_set_stage() {
        let update = touch(doc! { "$push": { "tags": "a" } });
        assert!(update.get_document("$set").unwrap().contains_key("updatedAt"));
        assert!(update.contains_key("$push"));
    }

    #[test]
    fn test_touch_extends_existing_set() {
        let update = touch(doc! { "$set": { "title": "x" } });
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "x");
        assert!(set.contains_key("updatedAt"));
    }
}
