//! HTTP handlers for the todo CRUD surface.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::http::{AppState, parse_id, preflight};
use crate::todos::model::TodoDraft;

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/todos",
            get(list_todos).post(create_todo).options(preflight),
        )
        .route(
            "/api/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .delete(delete_todo)
                .options(preflight),
        )
}

async fn list_todos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let todos = state.db.list_todos().await?;
    let count = todos.len();
    Ok(Json(json!({
        "success": true,
        "todos": todos,
        "count": count,
    })))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    match state.db.get_todo(id).await? {
        Some(todo) => Ok(Json(json!({"success": true, "todo": todo}))),
        None => Err(ApiError::NotFound("Todo")),
    }
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<TodoDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = body.map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
    draft.validate()?;

    let todo = state.db.create_todo(&draft).await?;
    info!(id = todo.id, title = %todo.title, "Todo created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Todo created",
            "todo": todo,
        })),
    ))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TodoDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(draft) = body.map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
    draft.validate()?;

    // Respond with the row re-read from the store so server-assigned
    // fields (updated_at) are reflected.
    match state.db.update_todo(id, &draft).await? {
        Some(todo) => {
            info!(id, "Todo updated");
            Ok(Json(json!({
                "success": true,
                "message": "Todo updated",
                "todo": todo,
            })))
        }
        None => Err(ApiError::NotFound("Todo")),
    }
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    if state.db.delete_todo(id).await? {
        info!(id, "Todo deleted");
        Ok(Json(json!({
            "success": true,
            "message": "Todo deleted successfully",
        })))
    } else {
        Err(ApiError::NotFound("Todo"))
    }
}
