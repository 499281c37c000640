//! Expert talk endpoints
//!
//! - `GET /api/expert-talks` - newest first, with YouTube thumbnails
//! - `POST /api/expert-talks`
//! - `DELETE /api/expert-talks/{id}`

use hyper::{Method, Response, StatusCode};

use crate::routes::{
    into_response, no_content_response, not_found_response, record_response, segments,
    ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn handle_expert_talks_request(
    state: &AppState,
    req: &ApiRequest,
) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let talks = &state.services.expert_talks;

    let response = match (
        req.method.clone(),
        segments(&req.path, "/api/expert-talks").as_slice(),
    ) {
        (Method::GET, []) => record_response(StatusCode::OK, &talks.list().await?),
        (Method::POST, []) => {
            record_response(StatusCode::CREATED, &talks.create(req.json()?).await?)
        }
        (Method::DELETE, [id]) => {
            talks.delete(id).await?;
            no_content_response()
        }
        _ => not_found_response(&req.path),
    };

    Ok(response)
}
