//! Event endpoints
//!
//! - `GET /api/events`, `GET /api/events/upcoming`, `GET /api/events/{id}`
//! - `GET /api/events/{id}/payment-link`, `GET /api/events/{id}/event-link`
//! - `POST /api/events`, `PUT /api/events/{id}`, `DELETE /api/events/{id}`
//! - `POST|DELETE /api/events/{id}/attendee/{userId}`

use hyper::{Method, Response, StatusCode};
use serde_json::json;

use crate::routes::{
    into_response, json_response, no_content_response, not_found_response, record_response,
    segments, ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

pub async fn handle_events_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let events = &state.services.events;

    let response = match (req.method.clone(), segments(&req.path, "/api/events").as_slice()) {
        (Method::GET, []) => record_response(StatusCode::OK, &events.list().await?),
        (Method::POST, []) => {
            record_response(StatusCode::CREATED, &events.create(req.json()?).await?)
        }
        (Method::GET, ["upcoming"]) => record_response(StatusCode::OK, &events.upcoming().await?),

        (Method::GET, [id]) => record_response(StatusCode::OK, &events.get(id).await?),
        (Method::PUT, [id]) => {
            record_response(StatusCode::OK, &events.update(id, req.json()?).await?)
        }
        (Method::DELETE, [id]) => {
            events.delete(id).await?;
            no_content_response()
        }

        (Method::GET, [id, "payment-link"]) => json_response(
            StatusCode::OK,
            &json!({ "paymentLink": events.payment_link(id).await? }),
        ),
        (Method::GET, [id, "event-link"]) => json_response(
            StatusCode::OK,
            &json!({ "eventLink": events.event_link(id).await? }),
        ),

        (Method::POST, [id, "attendee", user_id]) => {
            record_response(StatusCode::OK, &events.add_attendee(id, user_id).await?)
        }
        (Method::DELETE, [id, "attendee", user_id]) => {
            record_response(StatusCode::OK, &events.remove_attendee(id, user_id).await?)
        }

        _ => not_found_response(&req.path),
    };

    Ok(response)
}
