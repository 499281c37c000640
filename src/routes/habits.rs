//! Habit endpoints
//!
//! - `GET /api/habits/{userId}`
//! - `POST /api/habits`
//! - `PUT /api/habits/{habitId}/progress` with `{"progress": n}`
//! - `DELETE /api/habits/{habitId}`

use hyper::{Method, Response, StatusCode};
use serde::Deserialize;

use crate::routes::{
    into_response, no_content_response, not_found_response, path_param, record_response,
    segments, ApiRequest, FullBody,
};
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Default, Deserialize)]
struct ProgressBody {
    progress: Option<i64>,
}

pub async fn handle_habits_request(state: &AppState, req: &ApiRequest) -> Response<FullBody> {
    into_response(route(state, req).await)
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<Response<FullBody>> {
    let habits = &state.services.habits;

    let response = match (req.method.clone(), segments(&req.path, "/api/habits").as_slice()) {
        (Method::POST, []) => {
            record_response(StatusCode::CREATED, &habits.create(req.json()?).await?)
        }
        (Method::GET, [user_id]) => {
            let user_id = path_param("userId", user_id)?;
            record_response(StatusCode::OK, &habits.for_user(&user_id).await?)
        }
        (Method::PUT, [id, "progress"]) => {
            let body: ProgressBody = req.json()?;
            record_response(StatusCode::OK, &habits.set_progress(id, body.progress).await?)
        }
        (Method::DELETE, [id]) => {
            habits.delete(id).await?;
            no_content_response()
        }
        _ => not_found_response(&req.path),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{call, state};
    use serde_json::json;

    #[tokio::test]
    async fn test_habit_lifecycle() {
        let state = state();
        let (status, habit) = call(
            &state,
            ApiRequest::new(Method::POST, "/api/habits").with_json(json!({
                "userId": "user_1",
                "habitName": "Evening walk",
                "habitFrequency": "weekly",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(habit["habitFrequency"], "weekly");
        assert_eq!(habit["habitProgress"], 0);
        let id = habit["_id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &state,
            ApiRequest::new(Method::PUT, &format!("/api/habits/{}/progress", id))
                .with_json(json!({ "progress": 75 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["habitProgress"], 75);

        let (status, _) = call(
            &state,
            ApiRequest::new(Method::PUT, &format!("/api/habits/{}/progress", id))
                .with_json(json!({ "progress": 140 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = call(&state, ApiRequest::new(Method::GET, "/api/habits/user_1")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = call(
            &state,
            ApiRequest::new(Method::DELETE, &format!("/api/habits/{}", id)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, list) = call(&state, ApiRequest::new(Method::GET, "/api/habits/user_1")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_user_id_is_percent_decoded() {
        let state = state();
        let (status, _) = call(
            &state,
            ApiRequest::new(Method::POST, "/api/habits").with_json(json!({
                "userId": "user|42",
                "habitName": "Stretch",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) =
            call(&state, ApiRequest::new(Method::GET, "/api/habits/user%7C42")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["habitName"], "Stretch");
    }
}
