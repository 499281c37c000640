//! Business operations over the document store
//!
//! Each service method validates its input and then performs a single
//! store operation. Routes only translate HTTP to and from these calls.

pub mod admin;
pub mod courses;
pub mod events;
pub mod expert_talks;
pub mod habits;
pub mod resources;
pub mod users;
pub mod youtube;

use bson::{doc, oid::ObjectId};

use crate::db::Collections;
use crate::types::{HubError, Result};

pub use admin::{AdminService, HubStats};
pub use courses::{CourseInput, CourseService};
pub use events::{EventInput, EventService};
pub use expert_talks::{ExpertTalkInput, ExpertTalkService, ExpertTalkView};
pub use habits::{HabitInput, HabitService};
pub use resources::{ResourceInput, ResourceService};
pub use users::{
    BrainDumpInput, CheckinInput, CourseFilter, EventFilter, FocusInput, NewUser, PlannerInput,
    ProfileUpdate, UserProfile, UserService,
};

/// All services, sharing one set of collections
#[derive(Clone)]
pub struct Services {
    pub store: Collections,
    pub users: UserService,
    pub courses: CourseService,
    pub events: EventService,
    pub resources: ResourceService,
    pub expert_talks: ExpertTalkService,
    pub habits: HabitService,
    pub admin: AdminService,
}

impl Services {
    pub fn new(store: Collections) -> Self {
        Self {
            users: UserService::new(store.clone()),
            courses: CourseService::new(store.courses.clone()),
            events: EventService::new(store.events.clone()),
            resources: ResourceService::new(store.resources.clone()),
            expert_talks: ExpertTalkService::new(store.expert_talks.clone()),
            habits: HabitService::new(store.habits.clone()),
            admin: AdminService::new(store.clone()),
            store,
        }
    }

    /// Check the store answers queries
    pub async fn ping(&self) -> Result<()> {
        self.store.users.count(doc! {}).await.map(|_| ())
    }
}

/// Parse a hex ObjectId supplied by a client
pub fn parse_object_id(field: &str, raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| HubError::BadRequest(format!("Invalid {}: {}", field, raw)))
}

/// Keep a supplied string only if it has content
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
