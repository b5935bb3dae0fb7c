use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::Router;
use http::StatusCode;

use crate::application::todo_service::TodoService;
use crate::domain::error::AppError;
use crate::domain::query::{ListParams, Page, TodoListQuery};
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use crate::http::types::{ApiResult, AppJson, AppQuery};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route(
            "/todos/:id",
            get(get_todo::<S>).put(update_todo::<S>).patch(update_todo::<S>).delete(delete_todo::<S>),
        )
        .route("/todos/:id/toggle", patch(toggle_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<AppJson<Page<Todo>>> {
    let query = TodoListQuery::try_from(params)?;
    Ok(AppJson(state.service.list(query).await?))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<AppJson<Todo>> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.service.get(id).await?))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    AppJson(payload): AppJson<CreateTodo>,
) -> ApiResult<(StatusCode, AppJson<Todo>)> {
    let todo = state.service.create(payload).await?;
    tracing::info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, AppJson(todo)))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTodo>,
) -> ApiResult<AppJson<Todo>> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.service.update(id, payload).await?))
}

async fn toggle_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<AppJson<Todo>> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.service.toggle(id).await?))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// No todo has a non-UUID id, so a malformed one is simply not found.
fn parse_id(s: &str) -> Result<TodoId, AppError> { TodoId::parse(s).ok_or(AppError::NotFound("Todo")) }
