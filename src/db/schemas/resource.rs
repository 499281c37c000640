//! Resource document schema

use std::fmt;
use std::str::FromStr;

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for resources
pub const RESOURCE_COLLECTION: &str = "resources";

/// Kind of resource shown in the library
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Article,
    Video,
    Tool,
    Guide,
    Other,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Video => "video",
            Self::Tool => "tool",
            Self::Guide => "guide",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(Self::Article),
            "video" => Ok(Self::Video),
            "tool" => Ok(Self::Tool),
            "guide" => Ok(Self::Guide),
            "other" => Ok(Self::Other),
            unknown => Err(format!("Unknown resource category: {}", unknown)),
        }
    }
}

/// Resource document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub resource_title: String,

    pub resource_category: ResourceCategory,

    pub resource_link: String,

    #[serde(default)]
    pub resource_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl IntoIndexes for ResourceDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "resourceCategory": 1 },
            Some(
                IndexOptions::builder()
                    .name("resource_category_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for ResourceDoc {
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
