//! Course document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for courses
pub const COURSE_COLLECTION: &str = "courses";

/// Course document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CourseDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub course_title: String,

    pub course_description: String,

    pub course_instructor: String,

    pub course_start_date: DateTime,

    pub course_end_date: DateTime,

    /// Checkout URL; empty when the course is free
    #[serde(default)]
    pub payment_link: String,

    /// Where the course content is hosted
    #[serde(default)]
    pub course_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for CourseDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "courseStartDate": 1 },
            Some(
                IndexOptions::builder()
                    .name("course_start_date_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for CourseDoc {
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
