//! Course catalog

use std::sync::Arc;

use bson::{doc, oid::ObjectId, Document};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::CourseDoc;
use crate::db::DocumentCollection;
use crate::services::{non_empty, parse_object_id};
use crate::types::{parse_date, HubError, Result};

/// Course fields as sent by the admin UI. Create requires the first five.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub course_title: Option<String>,
    pub course_description: Option<String>,
    pub course_instructor: Option<String>,
    pub course_start_date: Option<String>,
    pub course_end_date: Option<String>,
    pub payment_link: Option<String>,
    pub course_link: Option<String>,
}

fn course_not_found() -> HubError {
    HubError::not_found("Course not found")
}

fn date_order_error() -> HubError {
    HubError::bad_request("courseEndDate cannot be before courseStartDate")
}

#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn DocumentCollection<CourseDoc>>,
}

impl CourseService {
    pub fn new(courses: Arc<dyn DocumentCollection<CourseDoc>>) -> Self {
        Self { courses }
    }

    pub async fn list(&self) -> Result<Vec<CourseDoc>> {
        self.courses
            .find(doc! {}, Some(doc! { "courseStartDate": 1 }))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<CourseDoc> {
        let id = parse_object_id("courseId", id)?;
        self.courses
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(course_not_found)
    }

    pub async fn payment_link(&self, id: &str) -> Result<String> {
        let course = self.get(id).await?;
        non_empty(Some(course.payment_link))
            .ok_or_else(|| HubError::not_found("Payment link not available for this course"))
    }

    pub async fn course_link(&self, id: &str) -> Result<String> {
        let course = self.get(id).await?;
        non_empty(Some(course.course_link))
            .ok_or_else(|| HubError::not_found("Course link not available for this course"))
    }

    pub async fn create(&self, input: CourseInput) -> Result<CourseDoc> {
        let (Some(title), Some(description), Some(instructor), Some(start), Some(end)) = (
            non_empty(input.course_title),
            non_empty(input.course_description),
            non_empty(input.course_instructor),
            non_empty(input.course_start_date),
            non_empty(input.course_end_date),
        ) else {
            return Err(HubError::bad_request("Missing required course fields"));
        };

        let course_start_date = parse_date("courseStartDate", &start)?;
        let course_end_date = parse_date("courseEndDate", &end)?;
        if course_end_date < course_start_date {
            return Err(date_order_error());
        }

        let course = self
            .courses
            .insert_one(CourseDoc {
                _id: None,
                course_title: title,
                course_description: description,
                course_instructor: instructor,
                course_start_date,
                course_end_date,
                payment_link: input.payment_link.unwrap_or_default(),
                course_link: input.course_link.unwrap_or_default(),
                created_at: None,
                updated_at: None,
            })
            .await?;

        info!(title = %course.course_title, "Created course");
        Ok(course)
    }

    /// `$set` the supplied fields. A new start or end date must keep the
    /// course's dates in order; the check is part of the update filter.
    pub async fn update(&self, id: &str, input: CourseInput) -> Result<CourseDoc> {
        let id = parse_object_id("courseId", id)?;

        let mut set = Document::new();
        for (field, value) in [
            ("courseTitle", input.course_title),
            ("courseDescription", input.course_description),
            ("courseInstructor", input.course_instructor),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(HubError::BadRequest(format!("{} cannot be empty", field)));
                }
                set.insert(field, value);
            }
        }
        if let Some(link) = input.payment_link {
            set.insert("paymentLink", link);
        }
        if let Some(link) = input.course_link {
            set.insert("courseLink", link);
        }

        let start = input
            .course_start_date
            .map(|raw| parse_date("courseStartDate", &raw))
            .transpose()?;
        let end = input
            .course_end_date
            .map(|raw| parse_date("courseEndDate", &raw))
            .transpose()?;

        let mut filter = doc! { "_id": id };
        match (start, end) {
            (Some(start), Some(end)) if end < start => return Err(date_order_error()),
            (Some(start), None) => {
                filter.insert("courseEndDate", doc! { "$gte": start });
            }
            (None, Some(end)) => {
                filter.insert("courseStartDate", doc! { "$lte": end });
            }
            _ => {}
        }
        if let Some(start) = start {
            set.insert("courseStartDate", start);
        }
        if let Some(end) = end {
            set.insert("courseEndDate", end);
        }

        let constrained = start.is_some() != end.is_some();
        match self
            .courses
            .find_one_and_update(filter, doc! { "$set": set })
            .await?
        {
            Some(course) => Ok(course),
            None if constrained && self.exists(id).await? => Err(date_order_error()),
            None => Err(course_not_found()),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_object_id("courseId", id)?;
        if self.courses.delete_one(doc! { "_id": id }).await? {
            info!(course_id = %id, "Deleted course");
            Ok(())
        } else {
            Err(course_not_found())
        }
    }

    async fn exists(&self, id: ObjectId) -> Result<bool> {
        Ok(self.courses.count(doc! { "_id": id }).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::COURSE_COLLECTION;
    use crate::db::MemoryCollection;
    use hyper::StatusCode;

    fn service() -> CourseService {
        CourseService::new(Arc::new(MemoryCollection::<CourseDoc>::new(COURSE_COLLECTION)))
    }

    fn input(start: &str, end: &str) -> CourseInput {
        CourseInput {
            course_title: Some("Mindfulness 101".into()),
            course_description: Some("Breathing and attention".into()),
            course_instructor: Some("Dr. Kim".into()),
            course_start_date: Some(start.into()),
            course_end_date: Some(end.into()),
            payment_link: Some("https://pay.example.com/c1".into()),
            course_link: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_links() {
        let service = service();
        let course = service
            .create(input("2025-03-01", "2025-04-01T10:00"))
            .await
            .unwrap();
        let id = course._id.unwrap().to_hex();

        assert_eq!(
            service.payment_link(&id).await.unwrap(),
            "https://pay.example.com/c1"
        );
        let err = service.course_link(&id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Course link not available for this course");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = service();

        let mut missing = input("2025-03-01", "2025-04-01");
        missing.course_instructor = None;
        let err = service.create(missing).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required course fields");

        let err = service
            .create(input("2025-04-01", "2025-03-01"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = service
            .create(input("soon", "2025-03-01"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_sorted_by_start() {
        let service = service();
        let mut later = input("2025-06-01", "2025-07-01");
        later.course_title = Some("Later".into());
        service.create(later).await.unwrap();
        service.create(input("2025-01-01", "2025-02-01")).await.unwrap();

        let courses = service.list().await.unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_title, "Mindfulness 101");
    }

    #[tokio::test]
    async fn test_update_fields_and_date_order() {
        let service = service();
        let course = service
            .create(input("2025-03-01", "2025-04-01"))
            .await
            .unwrap();
        let id = course._id.unwrap().to_hex();

        let updated = service
            .update(
                &id,
                CourseInput {
                    course_title: Some("Mindfulness 102".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.course_title, "Mindfulness 102");
        assert_eq!(updated.course_instructor, "Dr. Kim");

        // Start moved past the stored end
        let err = service
            .update(
                &id,
                CourseInput {
                    course_start_date: Some("2025-05-01".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let updated = service
            .update(
                &id,
                CourseInput {
                    course_end_date: Some("2025-06-01".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.course_end_date > course.course_end_date);
    }

    #[tokio::test]
    async fn test_update_rejects_end_before_start() {
        let service = service();
        let course = service
            .create(input("2025-03-01", "2025-04-01"))
            .await
            .unwrap();
        let id = course._id.unwrap().to_hex();

        // End moved before the stored start
        let err = service
            .update(
                &id,
                CourseInput {
                    course_end_date: Some("2025-02-01".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "courseEndDate cannot be before courseStartDate");

        // Both supplied, reversed
        let err = service
            .update(
                &id,
                CourseInput {
                    course_start_date: Some("2025-05-01".into()),
                    course_end_date: Some("2025-04-15".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "courseEndDate cannot be before courseStartDate");

        let stored = service.get(&id).await.unwrap();
        assert_eq!(stored.course_start_date, course.course_start_date);
        assert_eq!(stored.course_end_date, course.course_end_date);
        assert_eq!(stored.updated_at, course.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_course() {
        let service = service();
        let id = ObjectId::new().to_hex();

        let err = service
            .update(
                &id,
                CourseInput {
                    course_start_date: Some("2025-05-01".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = service.delete(&id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let course = service
            .create(input("2025-03-01", "2025-04-01"))
            .await
            .unwrap();
        let id = course._id.unwrap().to_hex();

        service.delete(&id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
