//! Habit tracking

use std::sync::Arc;

use bson::doc;
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{HabitDoc, HabitFrequency, MAX_HABIT_PROGRESS};
use crate::db::DocumentCollection;
use crate::services::{non_empty, parse_object_id};
use crate::types::{HubError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitInput {
    pub user_id: Option<String>,
    pub habit_name: Option<String>,
    pub habit_description: Option<String>,
    pub habit_frequency: Option<HabitFrequency>,
}

fn habit_not_found() -> HubError {
    HubError::not_found("Habit not found")
}

#[derive(Clone)]
pub struct HabitService {
    habits: Arc<dyn DocumentCollection<HabitDoc>>,
}

impl HabitService {
    pub fn new(habits: Arc<dyn DocumentCollection<HabitDoc>>) -> Self {
        Self { habits }
    }

    /// Habits owned by one member, oldest first
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<HabitDoc>> {
        self.habits
            .find(doc! { "userId": user_id }, Some(doc! { "createdAt": 1 }))
            .await
    }

    pub async fn create(&self, input: HabitInput) -> Result<HabitDoc> {
        let (Some(user_id), Some(habit_name)) =
            (non_empty(input.user_id), non_empty(input.habit_name))
        else {
            return Err(HubError::bad_request("userId and habitName are required"));
        };

        let habit = self
            .habits
            .insert_one(HabitDoc {
                _id: None,
                user_id,
                habit_name,
                habit_description: input.habit_description.unwrap_or_default(),
                habit_frequency: input.habit_frequency.unwrap_or_default(),
                habit_progress: 0,
                created_at: None,
                updated_at: None,
            })
            .await?;

        info!(user_id = %habit.user_id, name = %habit.habit_name, "Created habit");
        Ok(habit)
    }

    pub async fn set_progress(&self, id: &str, progress: Option<i64>) -> Result<HabitDoc> {
        let id = parse_object_id("habitId", id)?;
        let progress = progress
            .and_then(|p| i32::try_from(p).ok())
            .filter(|p| (0..=MAX_HABIT_PROGRESS).contains(p))
            .ok_or_else(|| {
                HubError::BadRequest(format!(
                    "progress must be a number between 0 and {}",
                    MAX_HABIT_PROGRESS
                ))
            })?;

        self.habits
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "habitProgress": progress } },
            )
            .await?
            .ok_or_else(habit_not_found)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id("habitId", id)?;
        if self.habits.delete_one(doc! { "_id": id }).await? {
            Ok(())
        } else {
            Err(habit_not_found())
        }
    }
}
