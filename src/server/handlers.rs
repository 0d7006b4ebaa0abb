//! Fallback and failure handlers shared by every route

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_status::SetStatus;

/// Body of every API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            message: message.into(),
            detail: None,
        }
    }
}

/// Structured 404 for API requests nothing is bound to
pub async fn api_not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!(
            "Route {} {} not found",
            method,
            uri.path()
        ))),
    )
        .into_response()
}

fn is_api_path(prefix: &str, path: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Static files of the built frontend; misses get the entry document with a 404
pub type SpaService = ServeDir<SetStatus<ServeFile>>;

/// Handles every request no binding matched
#[derive(Clone)]
pub struct Fallback {
    pub api_prefix: String,
    pub spa: Option<SpaService>,
}

impl Fallback {
    pub async fn handle(self, req: Request) -> Response {
        if is_api_path(&self.api_prefix, req.uri().path()) {
            let method = req.method().clone();
            let uri = req.uri().clone();
            return api_not_found(method, OriginalUri(uri)).await;
        }

        match self.spa {
            Some(spa) => match spa.oneshot(req).await {
                Ok(res) => res.map(Body::new),
                Err(never) => match never {},
            },
            None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }
}

/// Settings for [`catch_panic`]
#[derive(Clone)]
pub struct PanicPolicy {
    pub api_prefix: String,
    /// Hide panic messages from clients
    pub production: bool,
}

/// Turn a panicking handler into a 500 instead of dropping the connection
pub async fn catch_panic(State(policy): State<PanicPolicy>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Server error in {} {}: {}", method, path, message);
            server_error(&policy, &path, message)
        }
    }
}

fn server_error(policy: &PanicPolicy, path: &str, message: String) -> Response {
    if !is_api_path(&policy.api_prefix, path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response();
    }

    let body = if policy.production {
        ErrorResponse::new("Internal server error")
    } else {
        ErrorResponse {
            detail: Some(format!("handler for {} panicked", path)),
            ..ErrorResponse::new(message)
        }
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
