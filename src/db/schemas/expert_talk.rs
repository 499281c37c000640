//! Expert talk document schema
//!
//! A curated YouTube talk. The video id and thumbnail are derived from the
//! link when the talk is sent to clients, never stored.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for expert talks
pub const EXPERT_TALK_COLLECTION: &str = "experttalks";

/// Expert talk document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExpertTalkDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub title: String,

    pub youtube_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for ExpertTalkDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "createdAt": -1 },
            Some(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for ExpertTalkDoc {
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
