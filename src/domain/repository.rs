use async_trait::async_trait;

use super::category::{Category, CategoryId};
use super::error::AppResult;
use super::query::TodoListQuery;
use super::todo::{CreateTodo, Todo, TodoId, UpdateTodo};

/// Todo persistence. Every returned `Todo` carries its category projection.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn create(&self, input: CreateTodo) -> AppResult<Todo>;
    async fn get(&self, id: TodoId) -> AppResult<Option<Todo>>;
    /// Returns one page of matches and the total number of matches.
    async fn list(&self, query: &TodoListQuery) -> AppResult<(Vec<Todo>, i64)>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> AppResult<Option<Todo>>;
    async fn toggle(&self, id: TodoId) -> AppResult<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> AppResult<bool>;
    async fn exists(&self, id: TodoId) -> AppResult<bool>;
}

/// Category persistence. Deleting a category must null out `category_id`
/// on the todos that referenced it.
#[async_trait]
pub trait CategoryRepository: Send + Sync + 'static {
    async fn create(&self, name: String) -> AppResult<Category>;
    async fn get(&self, id: CategoryId) -> AppResult<Option<Category>>;
    async fn list(&self) -> AppResult<Vec<Category>>;
    async fn update(&self, id: CategoryId, name: String) -> AppResult<Option<Category>>;
    async fn delete(&self, id: CategoryId) -> AppResult<bool>;
    async fn exists(&self, id: CategoryId) -> AppResult<bool>;
}
