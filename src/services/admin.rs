//! Admin dashboard figures

use bson::{doc, DateTime};
use serde::Serialize;

use crate::db::Collections;
use crate::types::Result;

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    pub users: u64,
    pub courses: u64,
    pub events: u64,
    pub upcoming_events: u64,
    pub resources: u64,
    pub expert_talks: u64,
}

#[derive(Clone)]
pub struct AdminService {
    store: Collections,
}

impl AdminService {
    pub fn new(store: Collections) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let upcoming = doc! { "eventDate": { "$gt": DateTime::now() } };

        let (users, courses, events, upcoming_events, resources, expert_talks) = tokio::try_join!(
            self.store.users.count(doc! {}),
            self.store.courses.count(doc! {}),
            self.store.events.count(doc! {}),
            self.store.events.count(upcoming),
            self.store.resources.count(doc! {}),
            self.store.expert_talks.count(doc! {}),
        )?;

        Ok(HubStats {
            users,
            courses,
            events,
            upcoming_events,
            resources,
            expert_talks,
        })
    }
}
