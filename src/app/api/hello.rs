use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::routes::{Export, RouteModule};

#[derive(Debug, Default, Deserialize)]
pub struct GreetingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/hello
pub async fn get() -> Json<Value> {
    Json(json!({ "msg": "Hello from /hello: GET" }))
}

/// POST /api/hello
pub async fn post(Json(req): Json<GreetingRequest>) -> (StatusCode, Json<Value>) {
    let has = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
    if !has(&req.name) || !has(&req.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "msg": "Missing name or email" })),
        );
    }

    (StatusCode::OK, Json(json!({ "msg": "Hello from /hello: POST" })))
}

pub fn module() -> RouteModule {
    RouteModule::new()
        .with_export("GET", Export::handler(get))
        .with_export("POST", Export::handler(post))
}
