//! Course endpoints
//!
//! - `GET /api/courses`, `GET /api/courses/{id}`
//! - `GET /api/courses/{id}/payment-link`, `GET /api/courses/{id}/course-link`
//! - `POST /api/courses`, `PUT /api/courses/{id}`, `DELETE /api/courses/{id}`

use hyper::{Method, Response, StatusCode};
use serde_json::json;

use crate::routes::{
    into_response, json_response, no_content_response, not_found_response, record_response,
    segments, ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn handle_courses_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let courses = &state.services.courses;

    let response = match (req.method.clone(), segments(&req.path, "/api/courses").as_slice()) {
        (Method::GET, []) => record_response(StatusCode::OK, &courses.list().await?),
        (Method::POST, []) => {
            record_response(StatusCode::CREATED, &courses.create(req.json()?).await?)
        }

        (Method::GET, [id]) => record_response(StatusCode::OK, &courses.get(id).await?),
        (Method::PUT, [id]) => {
            record_response(StatusCode::OK, &courses.update(id, req.json()?).await?)
        }
        (Method::DELETE, [id]) => {
            courses.delete(id).await?;
            no_content_response()
        }

        (Method::GET, [id, "payment-link"]) => json_response(
            StatusCode::OK,
            &json!({ "paymentLink": courses.payment_link(id).await? }),
        ),
        (Method::GET, [id, "course-link"]) => json_response(
            StatusCode::OK,
            &json!({ "courseLink": courses.course_link(id).await? }),
        ),

        _ => not_found_response(&req.path),
    };

    Ok(response)
}
