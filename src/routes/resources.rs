//! Resource library endpoints
//!
//! - `GET /api/resources[?category=]`, `GET /api/resources/{id}`
//! - `POST /api/resources`, `PUT /api/resources/{id}`, `DELETE /api/resources/{id}`

use hyper::{Method, Response, StatusCode};

use crate::routes::{
    into_response, no_content_response, not_found_response, record_response, segments,
    ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn handle_resources_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let resources = &state.services.resources;

    let response = match (req.method.clone(), segments(&req.path, "/api/resources").as_slice()) {
        (Method::GET, []) => {
            let category = req.query_param("category");
            record_response(StatusCode::OK, &resources.list(category.as_deref()).await?)
        }
        (Method::POST, []) => {
            record_response(StatusCode::CREATED, &resources.create(req.json()?).await?)
        }
        (Method::GET, [id]) => record_response(StatusCode::OK, &resources.get(id).await?),
        (Method::PUT, [id]) => {
            record_response(StatusCode::OK, &resources.update(id, req.json()?).await?)
        }
        (Method::DELETE, [id]) => {
            resources.delete(id).await?;
            no_content_response()
        }
        _ => not_found_response(&req.path),
    };

    Ok(response)
}
