//! /api/todos, exported as a sub-router over an in-memory list

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::routes::{Export, RouteModule};
use crate::server::ErrorResponse;

#[derive(Debug, Clone, Serialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

type Todos = Arc<RwLock<Vec<Todo>>>;

async fn list(State(todos): State<Todos>) -> Json<Vec<Todo>> {
    Json(todos.read().await.clone())
}

async fn create(
    State(todos): State<Todos>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), (StatusCode, Json<ErrorResponse>)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Title must not be empty")),
        ));
    }

    let mut todos = todos.write().await;
    let todo = Todo {
        id: todos.last().map(|t| t.id + 1).unwrap_or(1),
        title: title.to_string(),
        done: false,
    };
    todos.push(todo.clone());

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn fetch(
    State(todos): State<Todos>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, (StatusCode, Json<ErrorResponse>)> {
    todos
        .read()
        .await
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Todo {} not found", id))),
            )
        })
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch))
        .with_state(Todos::default())
}

pub fn module() -> RouteModule {
    RouteModule::new().with_default(Export::router(router()))
}
