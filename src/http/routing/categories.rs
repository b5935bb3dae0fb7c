use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use http::StatusCode;

use crate::application::category_service::CategoryService;
use crate::domain::category::{Category, CategoryId, CreateCategory, UpdateCategory};
use crate::domain::error::AppError;
use crate::http::types::{ApiResult, AppJson};

#[derive(Clone)]
pub struct AppState<S: CategoryService> { pub service: S }

pub fn router<S: CategoryService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/categories", get(list_categories::<S>).post(create_category::<S>))
        .route(
            "/categories/:id",
            get(get_category::<S>).put(update_category::<S>).delete(delete_category::<S>),
        )
        .with_state(state)
}

async fn list_categories<S: CategoryService>(State(state): State<AppState<S>>) -> ApiResult<AppJson<Vec<Category>>> {
    Ok(AppJson(state.service.list().await?))
}

async fn get_category<S: CategoryService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<AppJson<Category>> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.service.get(id).await?))
}

async fn create_category<S: CategoryService>(
    State(state): State<AppState<S>>,
    AppJson(payload): AppJson<CreateCategory>,
) -> ApiResult<(StatusCode, AppJson<Category>)> {
    let category = state.service.create(payload).await?;
    tracing::info!(id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, AppJson(category)))
}

async fn update_category<S: CategoryService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCategory>,
) -> ApiResult<AppJson<Category>> {
    let id = parse_id(&id)?;
    Ok(AppJson(state.service.update(id, payload).await?))
}

async fn delete_category<S: CategoryService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    tracing::info!(%id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(s: &str) -> Result<CategoryId, AppError> { CategoryId::parse(s).ok_or(AppError::NotFound("Category")) }
