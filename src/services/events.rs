//! Community events and their attendees

use std::sync::Arc;

use bson::{doc, DateTime, Document};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::EventDoc;
use crate::db::DocumentCollection;
use crate::services::{non_empty, parse_object_id};
use crate::types::{parse_date, HubError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub event_name: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
    pub event_description: Option<String>,
    pub payment_link: Option<String>,
    pub event_link: Option<String>,
}

fn event_not_found() -> HubError {
    HubError::not_found("Event not found")
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn DocumentCollection<EventDoc>>,
}

impl EventService {
    pub fn new(events: Arc<dyn DocumentCollection<EventDoc>>) -> Self {
        Self { events }
    }

    pub async fn list(&self) -> Result<Vec<EventDoc>> {
        self.events
            .find(doc! {}, Some(doc! { "eventDate": 1 }))
            .await
    }

    /// Events after `now`, soonest first
    pub async fn upcoming(&self) -> Result<Vec<EventDoc>> {
        self.events
            .find(
                doc! { "eventDate": { "$gt": DateTime::now() } },
                Some(doc! { "eventDate": 1 }),
            )
            .await
    }

    pub async fn get(&self, id: &str) -> Result<EventDoc> {
        let id = parse_object_id("eventId", id)?;
        self.events
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(event_not_found)
    }

    pub async fn payment_link(&self, id: &str) -> Result<String> {
        let event = self.get(id).await?;
        non_empty(Some(event.payment_link))
            .ok_or_else(|| HubError::not_found("Payment link not available for this event"))
    }

    pub async fn event_link(&self, id: &str) -> Result<String> {
        let event = self.get(id).await?;
        non_empty(Some(event.event_link))
            .ok_or_else(|| HubError::not_found("Event link not available for this event"))
    }

    pub async fn create(&self, input: EventInput) -> Result<EventDoc> {
        let (Some(name), Some(date), Some(location), Some(description)) = (
            non_empty(input.event_name),
            non_empty(input.event_date),
            non_empty(input.event_location),
            non_empty(input.event_description),
        ) else {
            return Err(HubError::bad_request("Missing required event fields"));
        };

        let event = self
            .events
            .insert_one(EventDoc {
                _id: None,
                event_name: name,
                event_date: parse_date("eventDate", &date)?,
                event_location: location,
                event_description: description,
                attendees: Vec::new(),
                payment_link: input.payment_link.unwrap_or_default(),
                event_link: input.event_link.unwrap_or_default(),
                created_at: None,
                updated_at: None,
            })
            .await?;

        info!(name = %event.event_name, "Created event");
        Ok(event)
    }

    pub async fn update(&self, id: &str, input: EventInput) -> Result<EventDoc> {
        let id = parse_object_id("eventId", id)?;

        let mut set = Document::new();
        for (field, value) in [
            ("eventName", input.event_name),
            ("eventLocation", input.event_location),
            ("eventDescription", input.event_description),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(HubError::BadRequest(format!("{} cannot be empty", field)));
                }
                set.insert(field, value);
            }
        }
        if let Some(raw) = input.event_date {
            set.insert("eventDate", parse_date("eventDate", &raw)?);
        }
        if let Some(link) = input.payment_link {
            set.insert("paymentLink", link);
        }
        if let Some(link) = input.event_link {
            set.insert("eventLink", link);
        }

        self.events
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .await?
            .ok_or_else(event_not_found)
    }

    pub async fn add_attendee(&self, id: &str, user_id: &str) -> Result<EventDoc> {
        let id = parse_object_id("eventId", id)?;
        let user_id = parse_object_id("userId", user_id)?;

        self.events
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$addToSet": { "attendees": user_id } },
            )
            .await?
            .ok_or_else(event_not_found)
    }

    pub async fn remove_attendee(&self, id: &str, user_id: &str) -> Result<EventDoc> {
        let id = parse_object_id("eventId", id)?;
        let user_id = parse_object_id("userId", user_id)?;

        self.events
            .find_one_and_update(doc! { "_id": id }, doc! { "$pull": { "attendees": user_id } })
            .await?
            .ok_or_else(event_not_found)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id("eventId", id)?;
        if self.events.delete_one(doc! { "_id": id }).await? {
            info!(event_id = %id, "Deleted event");
            Ok(())
        } else {
            Err(event_not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::EVENT_COLLECTION;
    use crate::db::MemoryCollection;
    use bson::oid::ObjectId;
    use hyper::StatusCode;

    fn service() -> EventService {
        EventService::new(Arc::new(MemoryCollection::<EventDoc>::new(EVENT_COLLECTION)))
    }

    fn input(name: &str, date: &str) -> EventInput {
        EventInput {
            event_name: Some(name.into()),
            event_date: Some(date.into()),
            event_location: Some("Community Hall".into()),
            event_description: Some("Monthly meetup".into()),
            payment_link: None,
            event_link: Some("https://meet.example.com/x".into()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let service = service();
        let event = service
            .create(input("Meetup", "2030-01-01T18:00"))
            .await
            .unwrap();
        assert!(event.attendees.is_empty());
        assert!(event.payment_link.is_empty());

        let id = event._id.unwrap().to_hex();
        assert_eq!(
            service.event_link(&id).await.unwrap(),
            "https://meet.example.com/x"
        );
        let err = service.payment_link(&id).await.unwrap_err();
        assert_eq!(err.to_string(), "Payment link not available for this event");
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let service = service();
        let mut missing = input("Meetup", "2030-01-01");
        missing.event_location = None;
        let err = service.create(missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required event fields");
    }

    #[tokio::test]
    async fn test_upcoming_excludes_past_and_sorts() {
        let service = service();
        service.create(input("Past", "2001-01-01")).await.unwrap();
        service.create(input("Later", "2099-06-01")).await.unwrap();
        service.create(input("Sooner", "2098-01-01")).await.unwrap();

        let upcoming = service.upcoming().await.unwrap();
        let names: Vec<_> = upcoming.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["Sooner", "Later"]);

        assert_eq!(service.list().await.unwrap()[0].event_name, "Past");
    }

    #[tokio::test]
    async fn test_attendees_are_a_set() {
        let service = service();
        let event = service.create(input("Meetup", "2030-01-01")).await.unwrap();
        let id = event._id.unwrap().to_hex();
        let user = ObjectId::new().to_hex();

        service.add_attendee(&id, &user).await.unwrap();
        let event = service.add_attendee(&id, &user).await.unwrap();
        assert_eq!(event.attendees.len(), 1);

        let event = service.remove_attendee(&id, &user).await.unwrap();
        assert!(event.attendees.is_empty());

        let err = service.add_attendee(&id, "bogus").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service();
        let event = service.create(input("Meetup", "2030-01-01")).await.unwrap();
        let id = event._id.unwrap().to_hex();

        let updated = service
            .update(
                &id,
                EventInput {
                    event_location: Some("Library".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.event_location, "Library");
        assert_eq!(updated.event_name, "Meetup");

        service.delete(&id).await.unwrap();
        let err = service.get(&id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
