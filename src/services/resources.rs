//! Resource library

use std::sync::Arc;

use bson::{doc, Document};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{ResourceCategory, ResourceDoc};
use crate::db::DocumentCollection;
use crate::services::{non_empty, parse_object_id};
use crate::types::{HubError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    pub resource_title: Option<String>,
    pub resource_category: Option<String>,
    pub resource_link: Option<String>,
    pub resource_description: Option<String>,
}

fn resource_not_found() -> HubError {
    HubError::not_found("Resource not found")
}

fn parse_category(raw: &str) -> Result<ResourceCategory> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(HubError::BadRequest)
}

#[derive(Clone)]
pub struct ResourceService {
    resources: Arc<dyn DocumentCollection<ResourceDoc>>,
}

impl ResourceService {
    pub fn new(resources: Arc<dyn DocumentCollection<ResourceDoc>>) -> Self {
        Self { resources }
    }

    /// All resources, or those of one category
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<ResourceDoc>> {
        let filter = match category.filter(|c| !c.trim().is_empty()) {
            Some(raw) => doc! { "resourceCategory": parse_category(raw)?.as_str() },
            None => doc! {},
        };
        self.resources
            .find(filter, Some(doc! { "createdAt": -1 }))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<ResourceDoc> {
        let id = parse_object_id("resourceId", id)?;
        self.resources
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(resource_not_found)
    }

    pub async fn create(&self, input: ResourceInput) -> Result<ResourceDoc> {
        let (Some(title), Some(category), Some(link)) = (
            non_empty(input.resource_title),
            non_empty(input.resource_category),
            non_empty(input.resource_link),
        ) else {
            return Err(HubError::bad_request("Missing required resource fields"));
        };

        let resource = self
            .resources
            .insert_one(ResourceDoc {
                _id: None,
                resource_title: title,
                resource_category: parse_category(&category)?,
                resource_link: link,
                resource_description: input.resource_description.unwrap_or_default(),
                created_at: None,
                updated_at: None,
            })
            .await?;

        info!(title = %resource.resource_title, category = %resource.resource_category, "Created resource");
        Ok(resource)
    }

    pub async fn update(&self, id: &str, input: ResourceInput) -> Result<ResourceDoc> {
        let id = parse_object_id("resourceId", id)?;

        let mut set = Document::new();
        for (field, value) in [
            ("resourceTitle", input.resource_title),
            ("resourceLink", input.resource_link),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(HubError::BadRequest(format!("{} cannot be empty", field)));
                }
                set.insert(field, value);
            }
        }
        if let Some(raw) = input.resource_category {
            set.insert("resourceCategory", parse_category(&raw)?.as_str());
        }
        if let Some(description) = input.resource_description {
            set.insert("resourceDescription", description);
        }

        self.resources
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .await?
            .ok_or_else(resource_not_found)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id("resourceId", id)?;
        if self.resources.delete_one(doc! { "_id": id }).await? {
            info!(resource_id = %id, "Deleted resource");
            Ok(())
        } else {
            Err(resource_not_found())
        }
    }
}
