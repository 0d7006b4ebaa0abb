use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::routes::{Export, RouteModule};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/user
pub async fn get() -> Json<Value> {
    Json(json!({ "msg": "Hello from /user: GET" }))
}

/// POST /api/user
pub async fn post(Json(req): Json<CreateUserRequest>) -> (StatusCode, Json<Value>) {
    match (req.name.as_deref(), req.email.as_deref()) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => (
            StatusCode::OK,
            Json(json!({ "msg": "Hello from /user: POST" })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "msg": "Missing name or email" })),
        ),
    }
}

pub fn module() -> RouteModule {
    RouteModule::new()
        .with_export("GET", Export::handler(get))
        .with_export("POST", Export::handler(post))
}
