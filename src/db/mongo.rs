//! MongoDB client and collection wrapper

use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use tracing::info;

use crate::db::collection::{prepare_insert, touch, DocumentCollection, Record};
use crate::types::{HubError, Result};

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping the database
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| HubError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| HubError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Open a typed collection, applying its indexes
    pub async fn collection<T: Record>(&self, name: &str) -> Result<MongoCollection<T>> {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Record,
{
    inner: Collection<T>,
}

impl<T: Record> MongoCollection<T> {
    /// Create a new collection handle and apply indexes
    pub async fn new(client: &Client, db_name: &str, collection_name: &str) -> Result<Self> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| HubError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl<T: Record> DocumentCollection<T> for MongoCollection<T> {
    async fn find(&self, filter: Document, sort: Option<Document>) -> Result<Vec<T>> {
        let options = FindOptions::builder().sort(sort).build();

        let cursor = self
            .inner
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| HubError::Database(format!("Find failed: {}", e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| HubError::Database(format!("Error reading document: {}", e)))
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| HubError::Database(format!("Find failed: {}", e)))
    }

    async fn insert_one(&self, item: T) -> Result<T> {
        let item = prepare_insert(item);

        self.inner.insert_one(&item).await.map_err(|e| {
            // E11000: a unique index rejected the document
            if e.to_string().contains("E11000") {
                HubError::Conflict("Document already exists".into())
            } else {
                HubError::Database(format!("Insert failed: {}", e))
            }
        })?;

        Ok(item)
    }

    async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<T>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.inner
            .find_one_and_update(filter, touch(update))
            .with_options(options)
            .await
            .map_err(|e| HubError::Database(format!("Update failed: {}", e)))
    }

    async fn delete_one(&self, filter: Document) -> Result<bool> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| HubError::Database(format!("Delete failed: {}", e)))?;

        Ok(result.deleted_count == 1)
    }

    async fn count(&self, filter: Document) -> Result<u64> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| HubError::Database(format!("Count failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    // Exercising this module needs a running MongoDB; the services are
    // tested against MemoryCollection, which shares the same trait.
}
