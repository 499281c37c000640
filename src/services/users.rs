//! Member profiles and their activity
//!
//! Every mutation is one `findOneAndUpdate` on the user document. Check-ins,
//! planner entries, brain-dump notes and focus sessions are embedded
//! arrays; courses, resources and events are referenced by id.

use std::str::FromStr;

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::schemas::{
    BrainDumpEntry, CourseDoc, EmotionalCheckin, EventDoc, FocusSession, PlannerEntry,
    PlannerStatus, ResourceDoc, UserDoc,
};
use crate::db::Collections;
use crate::services::{non_empty, parse_object_id};
use crate::types::{parse_date, HubError, Result};

/// Body of `POST /api/users`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub clerk_id: Option<String>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
}

/// Editable profile fields. Anything else in the body is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinInput {
    pub checkin_mood: Option<String>,
    pub checkin_intensity: Option<i32>,
    pub checkin_note: Option<String>,
    pub checkin_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerInput {
    pub p_entry_time: Option<String>,
    pub p_entry_task: Option<String>,
    pub p_entry_status: Option<PlannerStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainDumpInput {
    pub bd_entry_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusInput {
    pub fs_duration_minutes: Option<i32>,
    pub fs_task: Option<String>,
}

/// Which courses to list for a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseFilter {
    #[default]
    All,
    Enrolled,
    Available,
}

impl FromStr for CourseFilter {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "all" => Ok(Self::All),
            "enrolled" => Ok(Self::Enrolled),
            "available" => Ok(Self::Available),
            other => Err(HubError::BadRequest(format!("Unknown course filter: {}", other))),
        }
    }
}

/// Which events to list for a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventFilter {
    #[default]
    All,
    Registered,
}

impl FromStr for EventFilter {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "all" => Ok(Self::All),
            "registered" => Ok(Self::Registered),
            other => Err(HubError::BadRequest(format!("Unknown event filter: {}", other))),
        }
    }
}

/// Everything the profile page shows, resolved in one call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: UserDoc,
    pub enrolled_courses: Vec<CourseDoc>,
    pub registered_events: Vec<EventDoc>,
    pub favorite_resources: Vec<ResourceDoc>,
    pub pending_planner_count: i64,
    pub checkin_count: i64,
    pub total_focus_minutes: i64,
}

/// The id reference sets on a user
#[derive(Debug, Clone, Copy)]
enum Reference {
    Course,
    Resource,
    Event,
}

impl Reference {
    fn field(self) -> &'static str {
        match self {
            Self::Course => "enrolledCourses",
            Self::Resource => "favoriteResources",
            Self::Event => "registeredEvents",
        }
    }

    fn id_name(self) -> &'static str {
        match self {
            Self::Course => "courseId",
            Self::Resource => "resourceId",
            Self::Event => "eventId",
        }
    }

    fn missing(self) -> HubError {
        match self {
            Self::Course => HubError::not_found("Course not found"),
            Self::Resource => HubError::not_found("Resource not found"),
            Self::Event => HubError::not_found("Event not found"),
        }
    }

    fn duplicate(self) -> HubError {
        let message = match self {
            Self::Course => "Already enrolled in this course",
            Self::Resource => "Resource already in favorites",
            Self::Event => "Already registered for this event",
        };
        HubError::Conflict(message.into())
    }
}

fn user_not_found() -> HubError {
    HubError::not_found("User not found")
}

#[derive(Clone)]
pub struct UserService {
    store: Collections,
}

impl UserService {
    pub fn new(store: Collections) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewUser) -> Result<UserDoc> {
        let (Some(clerk_id), Some(email)) =
            (non_empty(input.clerk_id), non_empty(input.user_email))
        else {
            return Err(HubError::bad_request("clerkId and userEmail are required"));
        };

        if self.store.users.count(doc! { "clerkId": &clerk_id }).await? > 0 {
            return Err(HubError::Conflict("User already exists".into()));
        }

        let user = UserDoc::new(
            clerk_id,
            input.user_first_name.unwrap_or_default(),
            input.user_last_name.unwrap_or_default(),
            email,
        );
        let user = self.store.users.insert_one(user).await?;
        info!(clerk_id = %user.clerk_id, "Created user");
        Ok(user)
    }

    pub async fn get(&self, clerk_id: &str) -> Result<UserDoc> {
        self.store
            .users
            .find_one(doc! { "clerkId": clerk_id })
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn update_profile(&self, clerk_id: &str, input: ProfileUpdate) -> Result<UserDoc> {
        let mut set = Document::new();
        if let Some(first) = input.user_first_name {
            set.insert("userFirstName", first);
        }
        if let Some(last) = input.user_last_name {
            set.insert("userLastName", last);
        }
        if let Some(email) = input.user_email {
            if email.trim().is_empty() {
                return Err(HubError::bad_request("userEmail cannot be empty"));
            }
            set.insert("userEmail", email);
        }

        self.update(doc! { "clerkId": clerk_id }, doc! { "$set": set })
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn add_checkin(&self, clerk_id: &str, input: CheckinInput) -> Result<UserDoc> {
        let mood = non_empty(input.checkin_mood)
            .ok_or_else(|| HubError::bad_request("checkinMood is required"))?;
        if let Some(intensity) = input.checkin_intensity {
            if !(1..=10).contains(&intensity) {
                return Err(HubError::bad_request(
                    "checkinIntensity must be between 1 and 10",
                ));
            }
        }
        let checkin_date = match input.checkin_date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_date("checkinDate", raw)?,
            _ => DateTime::now(),
        };

        let checkin = EmotionalCheckin {
            _id: ObjectId::new(),
            checkin_mood: mood,
            checkin_intensity: input.checkin_intensity,
            checkin_note: input.checkin_note,
            checkin_date,
        };

        self.push(clerk_id, "emotionalCheckins", bson::to_bson(&checkin)?)
            .await
    }

    /// Check-ins of a member; empty when the member does not exist
    pub async fn checkins(&self, clerk_id: &str) -> Result<Vec<EmotionalCheckin>> {
        Ok(self
            .find(clerk_id)
            .await?
            .map(|u| u.emotional_checkins)
            .unwrap_or_default())
    }

    pub async fn add_planner_entry(&self, clerk_id: &str, input: PlannerInput) -> Result<UserDoc> {
        let task = non_empty(input.p_entry_task)
            .ok_or_else(|| HubError::bad_request("pEntryTask is required"))?;

        let entry = PlannerEntry {
            _id: ObjectId::new(),
            p_entry_time: input.p_entry_time.unwrap_or_default(),
            p_entry_task: task,
            p_entry_status: input.p_entry_status.unwrap_or_default(),
            created_at: DateTime::now(),
        };

        self.push(clerk_id, "plannerEntries", bson::to_bson(&entry)?)
            .await
    }

    /// Planner entries of a member; empty when the member does not exist
    pub async fn planner(&self, clerk_id: &str) -> Result<Vec<PlannerEntry>> {
        Ok(self
            .find(clerk_id)
            .await?
            .map(|u| u.planner_entries)
            .unwrap_or_default())
    }

    /// Update the supplied fields of one planner entry in place
    pub async fn update_planner_entry(
        &self,
        clerk_id: &str,
        entry_id: &str,
        input: PlannerInput,
    ) -> Result<PlannerEntry> {
        let entry_id = parse_object_id("entryId", entry_id)?;

        let mut set = Document::new();
        if let Some(time) = input.p_entry_time {
            set.insert("plannerEntries.$.pEntryTime", time);
        }
        if let Some(task) = input.p_entry_task {
            if task.trim().is_empty() {
                return Err(HubError::bad_request("pEntryTask cannot be empty"));
            }
            set.insert("plannerEntries.$.pEntryTask", task);
        }
        if let Some(status) = input.p_entry_status {
            set.insert("plannerEntries.$.pEntryStatus", bson::to_bson(&status)?);
        }

        let user = self
            .update(
                doc! { "clerkId": clerk_id, "plannerEntries._id": entry_id },
                doc! { "$set": set },
            )
            .await?
            .ok_or_else(|| HubError::not_found("User or planner entry not found"))?;

        user.planner_entries
            .into_iter()
            .find(|e| e._id == entry_id)
            .ok_or_else(|| HubError::not_found("Planner entry not found"))
    }

    pub async fn delete_planner_entry(&self, clerk_id: &str, entry_id: &str) -> Result<UserDoc> {
        let entry_id = parse_object_id("entryId", entry_id)?;
        self.pull(clerk_id, "plannerEntries", doc! { "_id": entry_id }.into())
            .await
    }

    pub async fn add_brain_dump(&self, clerk_id: &str, input: BrainDumpInput) -> Result<UserDoc> {
        let text = non_empty(input.bd_entry_text)
            .ok_or_else(|| HubError::bad_request("bdEntryText is required"))?;

        let entry = BrainDumpEntry {
            _id: ObjectId::new(),
            bd_entry_text: text,
            created_at: DateTime::now(),
        };

        self.push(clerk_id, "brainDumpEntries", bson::to_bson(&entry)?)
            .await
    }

    pub async fn delete_brain_dump(&self, clerk_id: &str, entry_id: &str) -> Result<UserDoc> {
        let entry_id = parse_object_id("entryId", entry_id)?;
        self.pull(clerk_id, "brainDumpEntries", doc! { "_id": entry_id }.into())
            .await
    }

    pub async fn add_focus_session(&self, clerk_id: &str, input: FocusInput) -> Result<UserDoc> {
        let minutes = input
            .fs_duration_minutes
            .ok_or_else(|| HubError::bad_request("fsDurationMinutes is required"))?;
        if minutes <= 0 {
            return Err(HubError::bad_request(
                "fsDurationMinutes must be greater than zero",
            ));
        }

        let session = FocusSession {
            _id: ObjectId::new(),
            fs_duration_minutes: minutes,
            fs_task: non_empty(input.fs_task),
            completed_at: DateTime::now(),
        };

        self.push(clerk_id, "focusSessions", bson::to_bson(&session)?)
            .await
    }

    pub async fn enroll_course(&self, clerk_id: &str, course_id: &str) -> Result<UserDoc> {
        self.add_reference(clerk_id, Reference::Course, course_id)
            .await
    }

    pub async fn unenroll_course(&self, clerk_id: &str, course_id: &str) -> Result<UserDoc> {
        self.remove_reference(clerk_id, Reference::Course, course_id)
            .await
    }

    pub async fn favorite_resource(&self, clerk_id: &str, resource_id: &str) -> Result<UserDoc> {
        self.add_reference(clerk_id, Reference::Resource, resource_id)
            .await
    }

    pub async fn unfavorite_resource(&self, clerk_id: &str, resource_id: &str) -> Result<UserDoc> {
        self.remove_reference(clerk_id, Reference::Resource, resource_id)
            .await
    }

    pub async fn register_event(&self, clerk_id: &str, event_id: &str) -> Result<UserDoc> {
        self.add_reference(clerk_id, Reference::Event, event_id)
            .await
    }

    pub async fn unregister_event(&self, clerk_id: &str, event_id: &str) -> Result<UserDoc> {
        self.remove_reference(clerk_id, Reference::Event, event_id)
            .await
    }

    /// Course catalog as seen by one member
    pub async fn courses_for(&self, clerk_id: &str, filter: CourseFilter) -> Result<Vec<CourseDoc>> {
        let user = self.get(clerk_id).await?;
        let filter = match filter {
            CourseFilter::All => doc! {},
            CourseFilter::Enrolled => doc! { "_id": { "$in": user.enrolled_courses } },
            CourseFilter::Available => doc! { "_id": { "$nin": user.enrolled_courses } },
        };

        self.store
            .courses
            .find(filter, Some(doc! { "courseStartDate": 1 }))
            .await
    }

    /// Events by date as seen by one member
    pub async fn events_for(&self, clerk_id: &str, filter: EventFilter) -> Result<Vec<EventDoc>> {
        let user = self.get(clerk_id).await?;
        let filter = match filter {
            EventFilter::All => doc! {},
            EventFilter::Registered => doc! { "_id": { "$in": user.registered_events } },
        };

        self.store
            .events
            .find(filter, Some(doc! { "eventDate": 1 }))
            .await
    }

    pub async fn profile(&self, clerk_id: &str) -> Result<UserProfile> {
        let user = self.get(clerk_id).await?;

        let (enrolled_courses, registered_events, favorite_resources) = tokio::try_join!(
            self.store.courses.find(
                doc! { "_id": { "$in": user.enrolled_courses.clone() } },
                Some(doc! { "courseStartDate": 1 }),
            ),
            self.store.events.find(
                doc! { "_id": { "$in": user.registered_events.clone() } },
                Some(doc! { "eventDate": 1 }),
            ),
            self.store.resources.find(
                doc! { "_id": { "$in": user.favorite_resources.clone() } },
                None,
            ),
        )?;

        Ok(UserProfile {
            pending_planner_count: user.pending_planner_count() as i64,
            checkin_count: user.emotional_checkins.len() as i64,
            total_focus_minutes: user.total_focus_minutes(),
            enrolled_courses,
            registered_events,
            favorite_resources,
            user,
        })
    }

    async fn find(&self, clerk_id: &str) -> Result<Option<UserDoc>> {
        self.store.users.find_one(doc! { "clerkId": clerk_id }).await
    }

    async fn update(&self, filter: Document, update: Document) -> Result<Option<UserDoc>> {
        self.store.users.find_one_and_update(filter, update).await
    }

    async fn push(&self, clerk_id: &str, field: &str, value: Bson) -> Result<UserDoc> {
        self.update(doc! { "clerkId": clerk_id }, doc! { "$push": { field: value } })
            .await?
            .ok_or_else(user_not_found)
    }

    async fn pull(&self, clerk_id: &str, field: &str, condition: Bson) -> Result<UserDoc> {
        self.update(doc! { "clerkId": clerk_id }, doc! { "$pull": { field: condition } })
            .await?
            .ok_or_else(user_not_found)
    }

    async fn add_reference(
        &self,
        clerk_id: &str,
        reference: Reference,
        raw_id: &str,
    ) -> Result<UserDoc> {
        let id = parse_object_id(reference.id_name(), raw_id)?;

        let filter = doc! { "_id": id };
        let exists = match reference {
            Reference::Course => self.store.courses.count(filter).await?,
            Reference::Resource => self.store.resources.count(filter).await?,
            Reference::Event => self.store.events.count(filter).await?,
        };
        if exists == 0 {
            return Err(reference.missing());
        }

        let field = reference.field();
        let updated = self
            .update(
                doc! { "clerkId": clerk_id, field: { "$ne": id } },
                doc! { "$addToSet": { field: id } },
            )
            .await?;

        match updated {
            Some(user) => {
                debug!(clerk_id, field, id = %id, "Added reference");
                Ok(user)
            }
            None if self.find(clerk_id).await?.is_some() => Err(reference.duplicate()),
            None => Err(user_not_found()),
        }
    }

    async fn remove_reference(
        &self,
        clerk_id: &str,
        reference: Reference,
        raw_id: &str,
    ) -> Result<UserDoc> {
        let id = parse_object_id(reference.id_name(), raw_id)?;
        self.pull(clerk_id, reference.field(), Bson::ObjectId(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ResourceCategory, UserType};
    use hyper::StatusCode;

    fn service() -> (UserService, Collections) {
        let store = Collections::in_memory();
        (UserService::new(store.clone()), store)
    }

    async fn seed_user(service: &UserService, clerk_id: &str) -> UserDoc {
        service
            .create(NewUser {
                clerk_id: Some(clerk_id.into()),
                user_first_name: Some("Ada".into()),
                user_last_name: Some("Lovelace".into()),
                user_email: Some(format!("{}@example.com", clerk_id)),
            })
            .await
            .unwrap()
    }

    async fn seed_course(store: &Collections, title: &str, start_millis: i64) -> CourseDoc {
        store
            .courses
            .insert_one(CourseDoc {
                _id: None,
                course_title: title.into(),
                course_description: "desc".into(),
                course_instructor: "inst".into(),
                course_start_date: DateTime::from_millis(start_millis),
                course_end_date: DateTime::from_millis(start_millis + 1000),
                payment_link: String::new(),
                course_link: String::new(),
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap()
    }

    async fn seed_event(store: &Collections, name: &str, millis: i64) -> EventDoc {
        store
            .events
            .insert_one(EventDoc {
                _id: None,
                event_name: name.into(),
                event_date: DateTime::from_millis(millis),
                event_location: "Hall".into(),
                event_description: "desc".into(),
                attendees: vec![],
                payment_link: String::new(),
                event_link: String::new(),
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap()
    }

    async fn seed_resource(store: &Collections) -> ResourceDoc {
        store
            .resources
            .insert_one(ResourceDoc {
                _id: None,
                resource_title: "Breathing".into(),
                resource_category: ResourceCategory::Guide,
                resource_link: "https://example.com/breathe".into(),
                resource_description: String::new(),
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = service();
        let user = seed_user(&service, "user_1").await;
        assert!(user._id.is_some());
        assert!(user.created_at.is_some());
        assert_eq!(user.user_type, UserType::User);

        let fetched = service.get("user_1").await.unwrap();
        assert_eq!(fetched.user_email, "user_1@example.com");
    }

    #[tokio::test]
    async fn test_create_requires_clerk_id_and_email() {
        let (service, _) = service();
        let err = service
            .create(NewUser {
                clerk_id: Some("user_1".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_clerk_id_conflicts() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;
        let err = service
            .create(NewUser {
                clerk_id: Some("user_1".into()),
                user_email: Some("other@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let (service, _) = service();
        let err = service.get("ghost").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_update_profile_sets_only_supplied_fields() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;

        let user = service
            .update_profile(
                "user_1",
                ProfileUpdate {
                    user_first_name: Some("Grace".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.user_first_name, "Grace");
        assert_eq!(user.user_last_name, "Lovelace");
    }

    #[tokio::test]
    async fn test_checkins_default_date_and_listing() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;

        let user = service
            .add_checkin(
                "user_1",
                CheckinInput {
                    checkin_mood: Some("calm".into()),
                    checkin_intensity: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.emotional_checkins.len(), 1);

        let checkins = service.checkins("user_1").await.unwrap();
        assert_eq!(checkins[0].checkin_mood, "calm");
        assert!(checkins[0].checkin_date.timestamp_millis() > 0);

        assert!(service.checkins("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkin_intensity_range() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;
        let err = service
            .add_checkin(
                "user_1",
                CheckinInput {
                    checkin_mood: Some("calm".into()),
                    checkin_intensity: Some(11),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkin_for_unknown_user() {
        let (service, _) = service();
        let err = service
            .add_checkin(
                "ghost",
                CheckinInput {
                    checkin_mood: Some("calm".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_planner_update_keeps_omitted_fields() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;

        for task in ["stretch", "email"] {
            service
                .add_planner_entry(
                    "user_1",
                    PlannerInput {
                        p_entry_time: Some("09:00".into()),
                        p_entry_task: Some(task.into()),
                        p_entry_status: None,
                    },
                )
                .await
                .unwrap();
        }
        let entries = service.planner("user_1").await.unwrap();
        let target = entries[1]._id;

        let updated = service
            .update_planner_entry(
                "user_1",
                &target.to_hex(),
                PlannerInput {
                    p_entry_status: Some(PlannerStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated._id, target);
        assert_eq!(updated.p_entry_task, "email");
        assert_eq!(updated.p_entry_time, "09:00");
        assert_eq!(updated.p_entry_status, PlannerStatus::Completed);

        let entries = service.planner("user_1").await.unwrap();
        assert_eq!(entries[0].p_entry_status, PlannerStatus::Pending);
    }

    #[tokio::test]
    async fn test_planner_update_unknown_entry() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;
        let err = service
            .update_planner_entry("user_1", &ObjectId::new().to_hex(), PlannerInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = service
            .update_planner_entry("user_1", "not-an-id", PlannerInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_planner_and_brain_dump_entries() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;

        let user = service
            .add_planner_entry(
                "user_1",
                PlannerInput {
                    p_entry_task: Some("stretch".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let entry_id = user.planner_entries[0]._id.to_hex();
        let user = service
            .delete_planner_entry("user_1", &entry_id)
            .await
            .unwrap();
        assert!(user.planner_entries.is_empty());

        let user = service
            .add_brain_dump(
                "user_1",
                BrainDumpInput {
                    bd_entry_text: Some("too many tabs".into()),
                },
            )
            .await
            .unwrap();
        let note_id = user.brain_dump_entries[0]._id.to_hex();
        let user = service.delete_brain_dump("user_1", &note_id).await.unwrap();
        assert!(user.brain_dump_entries.is_empty());
    }

    #[tokio::test]
    async fn test_focus_session_validation() {
        let (service, _) = service();
        seed_user(&service, "user_1").await;

        let err = service
            .add_focus_session(
                "user_1",
                FocusInput {
                    fs_duration_minutes: Some(0),
                    fs_task: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let user = service
            .add_focus_session(
                "user_1",
                FocusInput {
                    fs_duration_minutes: Some(25),
                    fs_task: Some("report".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(user.total_focus_minutes(), 25);
    }

    #[tokio::test]
    async fn test_enroll_is_idempotent_guarded() {
        let (service, store) = service();
        seed_user(&service, "user_1").await;
        let course = seed_course(&store, "Mindfulness", 0).await;
        let course_id = course._id.unwrap().to_hex();

        let user = service.enroll_course("user_1", &course_id).await.unwrap();
        assert_eq!(user.enrolled_courses, vec![course._id.unwrap()]);

        let err = service
            .enroll_course("user_1", &course_id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(service.get("user_1").await.unwrap().enrolled_courses.len(), 1);

        let user = service.unenroll_course("user_1", &course_id).await.unwrap();
        assert!(user.enrolled_courses.is_empty());
    }

    #[tokio::test]
    async fn test_enroll_checks_references() {
        let (service, store) = service();
        seed_user(&service, "user_1").await;

        let err = service
            .enroll_course("user_1", &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Course not found");

        let course = seed_course(&store, "Mindfulness", 0).await;
        let err = service
            .enroll_course("ghost", &course._id.unwrap().to_hex())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_favorite_and_register() {
        let (service, store) = service();
        seed_user(&service, "user_1").await;
        let resource = seed_resource(&store).await;
        let event = seed_event(&store, "Meetup", 1_000).await;

        let user = service
            .favorite_resource("user_1", &resource._id.unwrap().to_hex())
            .await
            .unwrap();
        assert_eq!(user.favorite_resources.len(), 1);

        let user = service
            .register_event("user_1", &event._id.unwrap().to_hex())
            .await
            .unwrap();
        assert_eq!(user.registered_events.len(), 1);

        let err = service
            .register_event("user_1", &event._id.unwrap().to_hex())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Already registered for this event");

        let user = service
            .unfavorite_resource("user_1", &resource._id.unwrap().to_hex())
            .await
            .unwrap();
        assert!(user.favorite_resources.is_empty());
        let user = service
            .unregister_event("user_1", &event._id.unwrap().to_hex())
            .await
            .unwrap();
        assert!(user.registered_events.is_empty());
    }

    #[tokio::test]
    async fn test_course_filters() {
        let (service, store) = service();
        seed_user(&service, "user_1").await;
        let late = seed_course(&store, "Late", 5_000).await;
        let early = seed_course(&store, "Early", 1_000).await;
        service
            .enroll_course("user_1", &late._id.unwrap().to_hex())
            .await
            .unwrap();

        let all = service.courses_for("user_1", CourseFilter::All).await.unwrap();
        assert_eq!(all[0].course_title, "Early");
        assert_eq!(all.len(), 2);

        let enrolled = service
            .courses_for("user_1", CourseFilter::Enrolled)
            .await
            .unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0]._id, late._id);

        let available = service
            .courses_for("user_1", CourseFilter::Available)
            .await
            .unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0]._id, early._id);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("enrolled".parse::<CourseFilter>().unwrap(), CourseFilter::Enrolled);
        assert_eq!("".parse::<CourseFilter>().unwrap(), CourseFilter::All);
        assert!("mine".parse::<CourseFilter>().is_err());
        assert_eq!(
            "registered".parse::<EventFilter>().unwrap(),
            EventFilter::Registered
        );
    }

    #[tokio::test]
    async fn test_profile_aggregation() {
        let (service, store) = service();
        seed_user(&service, "user_1").await;
        let course = seed_course(&store, "Mindfulness", 0).await;
        let event = seed_event(&store, "Meetup", 1_000).await;
        seed_event(&store, "Other", 2_000).await;

        service
            .enroll_course("user_1", &course._id.unwrap().to_hex())
            .await
            .unwrap();
        service
            .register_event("user_1", &event._id.unwrap().to_hex())
            .await
            .unwrap();
        service
            .add_planner_entry(
                "user_1",
                PlannerInput {
                    p_entry_task: Some("stretch".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service
            .add_focus_session(
                "user_1",
                FocusInput {
                    fs_duration_minutes: Some(30),
                    fs_task: None,
                },
            )
            .await
            .unwrap();

        let profile = service.profile("user_1").await.unwrap();
        assert_eq!(profile.enrolled_courses.len(), 1);
        assert_eq!(profile.registered_events.len(), 1);
        assert!(profile.favorite_resources.is_empty());
        assert_eq!(profile.pending_planner_count, 1);
        assert_eq!(profile.checkin_count, 0);
        assert_eq!(profile.total_focus_minutes, 30);

        let registered = service
            .events_for("user_1", EventFilter::Registered)
            .await
            .unwrap();
        assert_eq!(registered.len(), 1);
    }
}
