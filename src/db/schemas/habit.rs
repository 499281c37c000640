//! Habit document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for habits
pub const HABIT_COLLECTION: &str = "habits";

/// Upper bound of `habitProgress`
pub const MAX_HABIT_PROGRESS: i32 = 100;

/// How often a habit is meant to be practised
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
}

/// Habit document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HabitDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Clerk id of the owner
    pub user_id: String,

    pub habit_name: String,

    #[serde(default)]
    pub habit_description: String,

    #[serde(default)]
    pub habit_frequency: HabitFrequency,

    /// Completion percentage, 0..=100
    #[serde(default)]
    pub habit_progress: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for HabitDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userId": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for HabitDoc {
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
