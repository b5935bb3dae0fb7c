use async_trait::async_trait;

use crate::domain::category::CategoryId;
use crate::domain::error::{AppError, AppResult};
use crate::domain::query::{Page, TodoListQuery};
use crate::domain::repository::{CategoryRepository, TodoRepository};
use crate::domain::todo::{CreateTodo, TITLE_MAX_CHARS, TITLE_MIN_CHARS, Todo, TodoId, UpdateTodo};

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self, query: TodoListQuery) -> AppResult<Page<Todo>>;
    async fn get(&self, id: TodoId) -> AppResult<Todo>;
    async fn create(&self, input: CreateTodo) -> AppResult<Todo>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> AppResult<Todo>;
    async fn toggle(&self, id: TodoId) -> AppResult<Todo>;
    async fn delete(&self, id: TodoId) -> AppResult<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository, C: CategoryRepository> {
    todos: R,
    categories: C,
}

impl<R: TodoRepository, C: CategoryRepository> TodoServiceImpl<R, C> {
    pub fn new(todos: R, categories: C) -> Self { Self { todos, categories } }

    async fn ensure_category(&self, id: CategoryId) -> AppResult<()> {
        if self.categories.exists(id).await? { Ok(()) } else { Err(AppError::CategoryNotFound(id)) }
    }
}

/// Trims and length-checks a title, counting characters rather than bytes.
pub fn normalize_title(raw: &str) -> AppResult<String> {
    let title = raw.trim();
    let len = title.chars().count();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(AppError::validation(format!(
            "title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

#[async_trait]
impl<R: TodoRepository, C: CategoryRepository> TodoService for TodoServiceImpl<R, C> {
    async fn list(&self, query: TodoListQuery) -> AppResult<Page<Todo>> {
        let (items, total) = self.todos.list(&query).await?;
        Ok(Page::new(items, total, query.pagination))
    }

    async fn get(&self, id: TodoId) -> AppResult<Todo> {
        self.todos.get(id).await?.ok_or(AppError::NotFound("Todo"))
    }

    async fn create(&self, mut input: CreateTodo) -> AppResult<Todo> {
        input.title = normalize_title(&input.title)?;
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }
        let todo = self.todos.create(input).await?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, mut input: UpdateTodo) -> AppResult<Todo> {
        if input.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        if let Some(title) = input.title.as_deref() {
            input.title = Some(normalize_title(title)?);
        }
        if let Some(Some(category_id)) = input.category_id {
            self.ensure_category(category_id).await?;
        }
        self.todos.update(id, input).await?.ok_or(AppError::NotFound("Todo"))
    }

    async fn toggle(&self, id: TodoId) -> AppResult<Todo> {
        self.todos.toggle(id).await?.ok_or(AppError::NotFound("Todo"))
    }

    async fn delete(&self, id: TodoId) -> AppResult<()> {
        if self.todos.delete(id).await? { Ok(()) } else { Err(AppError::NotFound("Todo")) }
    }
}
