//! Admin dashboard endpoints
//!
//! - `GET /api/admin/stats` - collection counts for the dashboard tiles
//!
//! Access is checked in [`crate::routes::dispatch`] before this handler runs.

use hyper::{Method, Response, StatusCode};

use crate::routes::{
    into_response, json_response, not_found_response, segments, ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn handle_admin_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let response = match (req.method.clone(), segments(&req.path, "/api/admin").as_slice()) {
        (Method::GET, ["stats"]) => {
            json_response(StatusCode::OK, &state.services.admin.stats().await?)
        }
        _ => not_found_response(&req.path),
    };

    Ok(response)
}
