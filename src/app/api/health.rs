//! GET /api/health

use axum::Json;
use serde::Serialize;

use crate::routes::{Export, RouteModule};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub fn module() -> RouteModule {
    RouteModule::new().with_default(Export::handler(health))
}
