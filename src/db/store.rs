//! The set of collections the hub works with

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::collection::DocumentCollection;
use crate::db::memory::MemoryCollection;
use crate::db::mongo::MongoClient;
use crate::db::schemas::{
    CourseDoc, EventDoc, ExpertTalkDoc, HabitDoc, ResourceDoc, UserDoc, COURSE_COLLECTION,
    EVENT_COLLECTION, EXPERT_TALK_COLLECTION, HABIT_COLLECTION, RESOURCE_COLLECTION,
    USER_COLLECTION,
};
use crate::types::Result;

/// Which storage implementation backs the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mongo => write!(f, "mongo"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Shared handles to every collection
#[derive(Clone)]
pub struct Collections {
    pub backend: StoreBackend,
    pub users: Arc<dyn DocumentCollection<UserDoc>>,
    pub courses: Arc<dyn DocumentCollection<CourseDoc>>,
    pub events: Arc<dyn DocumentCollection<EventDoc>>,
    pub resources: Arc<dyn DocumentCollection<ResourceDoc>>,
    pub expert_talks: Arc<dyn DocumentCollection<ExpertTalkDoc>>,
    pub habits: Arc<dyn DocumentCollection<HabitDoc>>,
}

impl Collections {
    /// Empty in-process collections
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            users: Arc::new(MemoryCollection::<UserDoc>::new(USER_COLLECTION)),
            courses: Arc::new(MemoryCollection::<CourseDoc>::new(COURSE_COLLECTION)),
            events: Arc::new(MemoryCollection::<EventDoc>::new(EVENT_COLLECTION)),
            resources: Arc::new(MemoryCollection::<ResourceDoc>::new(RESOURCE_COLLECTION)),
            expert_talks: Arc::new(MemoryCollection::<ExpertTalkDoc>::new(
                EXPERT_TALK_COLLECTION,
            )),
            habits: Arc::new(MemoryCollection::<HabitDoc>::new(HABIT_COLLECTION)),
        }
    }

    /// Open every collection on a connected MongoDB, creating indexes
    pub async fn mongo(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            backend: StoreBackend::Mongo,
            users: Arc::new(client.collection::<UserDoc>(USER_COLLECTION).await?),
            courses: Arc::new(client.collection::<CourseDoc>(COURSE_COLLECTION).await?),
            events: Arc::new(client.collection::<EventDoc>(EVENT_COLLECTION).await?),
            resources: Arc::new(client.collection::<ResourceDoc>(RESOURCE_COLLECTION).await?),
            expert_talks: Arc::new(
                client
                    .collection::<ExpertTalkDoc>(EXPERT_TALK_COLLECTION)
                    .await?,
            ),
            habits: Arc::new(client.collection::<HabitDoc>(HABIT_COLLECTION).await?),
        })
    }
}
