//! Event document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for events
pub const EVENT_COLLECTION: &str = "events";

/// Event document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub event_name: String,

    pub event_date: DateTime,

    pub event_location: String,

    pub event_description: String,

    /// User ids of attendees
    #[serde(default)]
    pub attendees: Vec<ObjectId>,

    #[serde(default)]
    pub payment_link: String,

    /// Joining link for online events
    #[serde(default)]
    pub event_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for EventDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "eventDate": 1 },
            Some(
                IndexOptions::builder()
                    .name("event_date_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for EventDoc {
    fn id(&self) -> Option<ObjectId> {
        self._id
    }

    fn assign_id(&mut self, id: ObjectId) {
        self._id = Some(id);
    }

    fn stamp_created(&mut self, now: DateTime) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }
}
