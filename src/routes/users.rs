//! Member endpoints
//!
//! ## Endpoints
//!
//! - `POST /api/users` - Create a member
//! - `GET|PUT /api/users/{clerkId}` - Read or edit the profile
//! - `POST /api/users/{clerkId}/checkin`, `GET .../checkins`
//! - `POST|GET /api/users/{clerkId}/planner`, `PUT .../planner/{entryId}`,
//!   `PUT .../planner-delete`
//! - `POST /api/users/{clerkId}/braindump`, `PUT .../braindump-delete`
//! - `POST /api/users/{clerkId}/focus`
//! - `POST /api/users/{clerkId}/{enrollCourse,unenrollCourse,favoriteResource,
//!   unfavoriteResource,registerEvent,unregisterEvent}`
//! - `GET /api/users/{clerkId}/courses?filter=`, `GET .../events?filter=`,
//!   `GET .../profile`

use hyper::{Method, Response, StatusCode};

use crate::routes::{
    into_response, not_found_response, path_param, record_response, segments, ApiRequest,
    FullBody,
};
use crate::server::AppState;
use crate::services::{CourseFilter, EventFilter};
use crate::types::{HubError, Result};

/// Read a required string id from the JSON body
fn body_id(req: &ApiRequest, field: &str) -> Result<String> {
    let body: serde_json::Value = req.json()?;
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| HubError::BadRequest(format!("{} is required", field)))
}

/// Main handler for /api/users/* routes
pub async fn handle_users_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let users = &state.services.users;
    let parts = segments(&req.path, "/api/users");

    let clerk_id = match parts.first() {
        Some(raw) => path_param("clerkId", raw)?,
        None => String::new(),
    };
    let clerk_id = clerk_id.as_str();

    let response = match (req.method.clone(), parts.as_slice()) {
        (Method::POST, []) => record_response(StatusCode::CREATED, &users.create(req.json()?).await?),

        (Method::GET, [_]) => record_response(StatusCode::OK, &users.get(clerk_id).await?),
        (Method::PUT, [_]) => record_response(
            StatusCode::OK,
            &users.update_profile(clerk_id, req.json()?).await?,
        ),

        (Method::POST, [_, "checkin"]) => record_response(
            StatusCode::CREATED,
            &users.add_checkin(clerk_id, req.json()?).await?,
        ),
        (Method::GET, [_, "checkins"]) => {
            record_response(StatusCode::OK, &users.checkins(clerk_id).await?)
        }

        (Method::POST, [_, "planner"]) => record_response(
            StatusCode::CREATED,
            &users.add_planner_entry(clerk_id, req.json()?).await?,
        ),
        (Method::GET, [_, "planner"]) => {
            record_response(StatusCode::OK, &users.planner(clerk_id).await?)
        }
        (Method::PUT, [_, "planner", entry_id]) => record_response(
            StatusCode::OK,
            &users
                .update_planner_entry(clerk_id, entry_id, req.json()?)
                .await?,
        ),
        (Method::PUT, [_, "planner-delete"]) => {
            let entry_id = body_id(req, "entryId")?;
            record_response(
                StatusCode::OK,
                &users.delete_planner_entry(clerk_id, &entry_id).await?,
            )
        }

        (Method::POST, [_, "braindump"]) => record_response(
            StatusCode::CREATED,
            &users.add_brain_dump(clerk_id, req.json()?).await?,
        ),
        (Method::PUT, [_, "braindump-delete"]) => {
            let entry_id = body_id(req, "entryId")?;
            record_response(
                StatusCode::OK,
                &users.delete_brain_dump(clerk_id, &entry_id).await?,
            )
        }

        (Method::POST, [_, "focus"]) => record_response(
            StatusCode::CREATED,
            &users.add_focus_session(clerk_id, req.json()?).await?,
        ),

        (Method::POST, [_, action]) if is_reference_action(action) => {
            let field = match *action {
                "enrollCourse" | "unenrollCourse" => "courseId",
                "favoriteResource" | "unfavoriteResource" => "resourceId",
                _ => "eventId",
            };
            let id = body_id(req, field)?;
            let user = match *action {
                "enrollCourse" => users.enroll_course(clerk_id, &id).await?,
                "unenrollCourse" => users.unenroll_course(clerk_id, &id).await?,
                "favoriteResource" => users.favorite_resource(clerk_id, &id).await?,
                "unfavoriteResource" => users.unfavorite_resource(clerk_id, &id).await?,
                "registerEvent" => users.register_event(clerk_id, &id).await?,
                _ => users.unregister_event(clerk_id, &id).await?,
            };
            record_response(StatusCode::OK, &user)
        }

        (Method::GET, [_, "courses"]) => {
            let filter: CourseFilter = req.query_param("filter").unwrap_or_default().parse()?;
            record_response(StatusCode::OK, &users.courses_for(clerk_id, filter).await?)
        }
        (Method::GET, [_, "events"]) => {
            let filter: EventFilter = req.query_param("filter").unwrap_or_default().parse()?;
            record_response(StatusCode::OK, &users.events_for(clerk_id, filter).await?)
        }
        (Method::GET, [_, "profile"]) => {
            record_response(StatusCode::OK, &users.profile(clerk_id).await?)
        }

        _ => not_found_response(&req.path),
    };

    Ok(response)
}

fn is_reference_action(action: &str) -> bool {
    matches!(
        action,
        "enrollCourse"
            | "unenrollCourse"
            | "favoriteResource"
            | "unfavoriteResource"
            | "registerEvent"
            | "unregisterEvent"
    )
}
