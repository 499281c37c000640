//! Curated expert talks

use std::sync::Arc;

use bson::doc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::schemas::ExpertTalkDoc;
use crate::db::DocumentCollection;
use crate::services::{non_empty, parse_object_id, youtube};
use crate::types::{HubError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertTalkInput {
    pub title: Option<String>,
    pub youtube_link: Option<String>,
}

/// A talk as sent to clients, with its video id and thumbnail resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertTalkView {
    #[serde(flatten)]
    pub talk: ExpertTalkDoc,
    pub youtube_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl From<ExpertTalkDoc> for ExpertTalkView {
    fn from(talk: ExpertTalkDoc) -> Self {
        let youtube_id = youtube::video_id(&talk.youtube_link);
        let thumbnail_url = youtube_id.as_deref().map(youtube::thumbnail_url);
        Self {
            talk,
            youtube_id,
            thumbnail_url,
        }
    }
}

#[derive(Clone)]
pub struct ExpertTalkService {
    talks: Arc<dyn DocumentCollection<ExpertTalkDoc>>,
}

impl ExpertTalkService {
    pub fn new(talks: Arc<dyn DocumentCollection<ExpertTalkDoc>>) -> Self {
        Self { talks }
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<ExpertTalkView>> {
        let talks = self
            .talks
            .find(doc! {}, Some(doc! { "createdAt": -1 }))
            .await?;
        Ok(talks.into_iter().map(ExpertTalkView::from).collect())
    }

    pub async fn create(&self, input: ExpertTalkInput) -> Result<ExpertTalkView> {
        let (Some(title), Some(youtube_link)) =
            (non_empty(input.title), non_empty(input.youtube_link))
        else {
            return Err(HubError::bad_request("title and youtubeLink are required"));
        };

        let talk = self
            .talks
            .insert_one(ExpertTalkDoc {
                _id: None,
                title: title.trim().to_string(),
                youtube_link: youtube_link.trim().to_string(),
                created_at: None,
                updated_at: None,
            })
            .await?;

        info!(title = %talk.title, "Created expert talk");
        Ok(talk.into())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id("id", id)?;
        if self.talks.delete_one(doc! { "_id": id }).await? {
            Ok(())
        } else {
            Err(HubError::not_found("Not found"))
        }
    }
}
