//! User document schema
//!
//! A member profile keyed by the Clerk identity, carrying the member's
//! productivity data as embedded arrays and their catalog choices as
//! ObjectId reference sets.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::collection::{IntoIndexes, Record};

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// Role of a member
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    User,
    Admin,
}

/// Status of a planner entry
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlannerStatus {
    #[default]
    Pending,
    Completed,
}

/// One emotional check-in
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalCheckin {
    #[serde(rename = "_id")]
    pub _id: ObjectId,

    /// Free-form mood label ("calm", "anxious", ...)
    pub checkin_mood: String,

    /// Optional 1-10 intensity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin_intensity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin_note: Option<String>,

    pub checkin_date: DateTime,
}

/// One planner entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannerEntry {
    #[serde(rename = "_id")]
    pub _id: ObjectId,

    /// Time slot as entered by the member, e.g. "09:30"
    #[serde(default)]
    pub p_entry_time: String,

    pub p_entry_task: String,

    #[serde(default)]
    pub p_entry_status: PlannerStatus,

    pub created_at: DateTime,
}

/// One brain-dump note
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrainDumpEntry {
    #[serde(rename = "_id")]
    pub _id: ObjectId,

    pub bd_entry_text: String,

    pub created_at: DateTime,
}

/// One completed focus session
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    #[serde(rename = "_id")]
    pub _id: ObjectId,

    pub fs_duration_minutes: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_task: Option<String>,

    pub completed_at: DateTime,
}

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Opaque identifier issued by Clerk
    pub clerk_id: String,

    #[serde(default)]
    pub user_first_name: String,

    #[serde(default)]
    pub user_last_name: String,

    pub user_email: String,

    #[serde(default)]
    pub user_type: UserType,

    #[serde(default)]
    pub emotional_checkins: Vec<EmotionalCheckin>,

    #[serde(default)]
    pub planner_entries: Vec<PlannerEntry>,

    #[serde(default)]
    pub brain_dump_entries: Vec<BrainDumpEntry>,

    #[serde(default)]
    pub focus_sessions: Vec<FocusSession>,

    /// Course ids the member is enrolled in
    #[serde(default)]
    pub enrolled_courses: Vec<ObjectId>,

    /// Resource ids the member has favourited
    #[serde(default)]
    pub favorite_resources: Vec<ObjectId>,

    /// Event ids the member registered for
    #[serde(default)]
    pub registered_events: Vec<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl UserDoc {
    /// Create a new member profile with empty activity
    pub fn new(
        clerk_id: String,
        user_first_name: String,
        user_last_name: String,
        user_email: String,
    ) -> Self {
        Self {
            clerk_id,
            user_first_name,
            user_last_name,
            user_email,
            user_type: UserType::User,
            ..Default::default()
        }
    }

    /// Number of planner entries still pending
    pub fn pending_planner_count(&self) -> usize {
        self.planner_entries
            .iter()
            .filter(|e| e.p_entry_status == PlannerStatus::Pending)
            .count()
    }

    /// Total minutes across all focus sessions
    pub fn total_focus_minutes(&self) -> i64 {
        self.focus_sessions
            .iter()
            .map(|s| i64::from(s.fs_duration_minutes))
            .sum()
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "clerkId": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("clerk_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for UserDoc {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let user = UserDoc::new(
            "user_abc".into(),
            "Ada".into(),
            "Lovelace".into(),
            "ada@example.com".into(),
        );
        let doc = bson::to_document(&user).unwrap();

        assert_eq!(doc.get_str("clerkId").unwrap(), "user_abc");
        assert_eq!(doc.get_str("userFirstName").unwrap(), "Ada");
        assert_eq!(doc.get_str("userType").unwrap(), "user");
        assert!(doc.get_array("plannerEntries").unwrap().is_empty());
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let user: UserDoc = bson::from_document(doc! {
            "clerkId": "user_abc",
            "userEmail": "ada@example.com",
        })
        .unwrap();

        assert!(user.enrolled_courses.is_empty());
        assert_eq!(user.user_type, UserType::User);
    }

    #[test]
    fn test_activity_summaries() {
        let now = DateTime::now();
        let mut user = UserDoc::new("u".into(), "".into(), "".into(), "u@example.com".into());
        user.planner_entries = vec![
            PlannerEntry {
                _id: ObjectId::new(),
                p_entry_time: "09:00".into(),
                p_entry_task: "stretch".into(),
                p_entry_status: PlannerStatus::Pending,
                created_at: now,
            },
            PlannerEntry {
                _id: ObjectId::new(),
                p_entry_time: "10:00".into(),
                p_entry_task: "email".into(),
                p_entry_status: PlannerStatus::Completed,
                created_at: now,
            },
        ];
        user.focus_sessions = vec![
            FocusSession {
                _id: ObjectId::new(),
                fs_duration_minutes: 25,
                fs_task: None,
                completed_at: now,
            },
            FocusSession {
                _id: ObjectId::new(),
                fs_duration_minutes: 50,
                fs_task: Some("report".into()),
                completed_at: now,
            },
        ];

        assert_eq!(user.pending_planner_count(), 1);
        assert_eq!(user.total_focus_minutes(), 75);
    }
}
