//! HTTP routes for the hub
//!
//! The server collects each request into an [`ApiRequest`] and hands it to
//! [`dispatch`], which picks the route module by path prefix.

pub mod admin;
pub mod courses;
pub mod events;
pub mod expert_talks;
pub mod habits;
pub mod health;
pub mod resources;
pub mod users;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::auth::{required_access, AccessLevel, ApiKeyValidator};
use crate::db::to_api_json;
use crate::server::AppState;
use crate::types::{HubError, Result};

pub use health::{health_check, readiness_check, version_info};

pub type FullBody = Full<Bytes>;

/// A fully received request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Attach a JSON body
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Decode the body. An empty body decodes as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("{}")?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// First value of a query string parameter, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key != name {
                return None;
            }
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.into_owned())
        })
    }

    fn header(&self, name: impl hyper::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Admin key presented by the client, if any
    pub fn api_key(&self) -> Option<&str> {
        ApiKeyValidator::extract_key(self.header("x-api-key"), self.header(AUTHORIZATION))
    }
}

/// Route a request to its handler
pub async fn dispatch(state: &AppState, req: ApiRequest) -> Response<FullBody> {
    if req.method == Method::OPTIONS {
        return preflight_response();
    }

    if required_access(&req.method, &req.path) == AccessLevel::Admin {
        match state.api_keys.validate(req.api_key()) {
            Some(AccessLevel::Admin) => {}
            Some(AccessLevel::Public) => {
                return into_response(Err(HubError::Unauthorized(
                    "Admin API key required".to_string(),
                )))
            }
            None => {
                warn!(path = %req.path, "Rejected invalid admin API key");
                return into_response(Err(HubError::Unauthorized("Invalid API key".to_string())));
            }
        }
    }

    let path = req.path.clone();
    match (req.method.clone(), path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => health_check(state),
        (Method::GET, "/ready") | (Method::GET, "/readyz") => readiness_check(state).await,
        (Method::GET, "/version") => version_info(),

        (_, p) if under(p, "/api/users") => users::handle_users_request(state, &req).await,
        (_, p) if under(p, "/api/courses") => courses::handle_courses_request(state, &req).await,
        (_, p) if under(p, "/api/events") => events::handle_events_request(state, &req).await,
        (_, p) if under(p, "/api/resources") => {
            resources::handle_resources_request(state, &req).await
        }
        (_, p) if under(p, "/api/expert-talks") => {
            expert_talks::handle_expert_talks_request(state, &req).await
        }
        (_, p) if under(p, "/api/habits") => habits::handle_habits_request(state, &req).await,
        (_, p) if under(p, "/api/admin") => admin::handle_admin_request(state, &req).await,

        _ => not_found_response(&path),
    }
}

/// Whether `path` is `prefix` or below it
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Path segments after `prefix`, ignoring empty ones
pub(crate) fn segments<'a>(path: &'a str, prefix: &str) -> Vec<&'a str> {
    path.strip_prefix(prefix)
        .unwrap_or("")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Percent-decode an identifier taken from the path
pub(crate) fn path_param(field: &str, raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .map_err(|_| HubError::BadRequest(format!("Invalid {}", field)))
}

// =============================================================================
// Response Helpers
// =============================================================================

fn with_cors(mut response: Response<FullBody>) -> Response<FullBody> {
    response
        .headers_mut()
        .insert("access-control-allow-origin", HeaderValue::from_static("*"));
    response
}

/// Serialize `body` as plain JSON
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

/// Serialize a stored record, turning ids and dates into strings
pub fn record_response<T: Serialize>(status: StatusCode, record: &T) -> Response<FullBody> {
    match to_api_json(record) {
        Ok(json) => json_response(status, &json),
        Err(e) => hub_error_response(e),
    }
}

/// `{"error": message}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response<FullBody> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Map a service error onto its status
pub fn hub_error_response(err: HubError) -> Response<FullBody> {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    error_response(status, &err.to_string())
}

/// Turn a handler result into a response
pub fn into_response(result: Result<Response<FullBody>>) -> Response<FullBody> {
    result.unwrap_or_else(hub_error_response)
}

/// 204 for a successful delete
pub fn no_content_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    with_cors(response)
}

/// CORS preflight response
pub fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert("access-control-allow-headers", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    with_cors(response)
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({ "error": "Not Found", "path": path }),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use clap::Parser;
    use http_body_util::BodyExt;

    use super::*;
    use crate::config::Args;
    use crate::db::Collections;
    use crate::services::Services;

    pub fn state() -> Arc<AppState> {
        state_with_args(&[])
    }

    pub fn state_with_args(extra: &[&str]) -> Arc<AppState> {
        let mut argv = vec!["community-hub", "--store-backend", "memory"];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        Arc::new(AppState::new(args, Services::new(Collections::in_memory())))
    }

    /// Dispatch and decode the JSON reply
    pub async fn call(state: &AppState, req: ApiRequest) -> (StatusCode, serde_json::Value) {
        let response = dispatch(state, req).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map(|c| c.to_bytes())
            .unwrap_or_default();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
