//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; one task per connection. Each request body
//! is collected up to the configured limit before routing.

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::CONTENT_LENGTH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::ApiKeyValidator;
use crate::config::Args;
use crate::routes::{self, error_response, ApiRequest, FullBody};
use crate::services::Services;
use crate::types::{HubError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub services: Services,
    /// Checks the admin key on write and dashboard routes
    pub api_keys: ApiKeyValidator,
}

impl AppState {
    pub fn new(args: Args, services: Services) -> Self {
        let api_keys = ApiKeyValidator::new(args.admin_api_key.clone());
        Self {
            args,
            services,
            api_keys,
        }
    }
}

/// Start the HTTP server and serve until ctrl-c or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Community hub listening on {} (store: {})",
        state.args.listen, state.services.store.backend
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }
    if !state.api_keys.is_configured() {
        warn!("No admin API key configured - admin routes are open");
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            debug!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping listener");
                break;
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Collect, route and log a single request
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, Infallible> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!(%request_id, %addr, %method, %path, "Request received");

    let response = match read_request(req, state.args.max_body_bytes).await {
        Ok(api_req) => routes::dispatch(&state, api_req).await,
        Err(e) => {
            warn!(%request_id, %method, %path, "Rejected request body: {}", e);
            error_response(e.status_code(), &e.to_string())
        }
    };

    info!(
        %request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {} {}",
        method,
        path,
        response.status().as_u16()
    );

    Ok(response)
}

/// Buffer the body, enforcing `max_bytes`
async fn read_request<B>(req: Request<B>, max_bytes: usize) -> Result<ApiRequest>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > max_bytes) {
        return Err(HubError::PayloadTooLarge(max_bytes));
    }

    let (parts, body) = req.into_parts();
    let body: Bytes = Limited::new(body, max_bytes)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<http_body_util::LengthLimitError>() {
                HubError::PayloadTooLarge(max_bytes)
            } else {
                HubError::BadRequest(format!("Failed to read request body: {}", e))
            }
        })?
        .to_bytes();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut api_req = ApiRequest::new(parts.method, path_and_query);
    api_req.headers = parts.headers;
    api_req.body = body;
    Ok(api_req)
}
