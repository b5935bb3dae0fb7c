use async_trait::async_trait;

use crate::domain::category::{Category, CategoryId, CreateCategory, NAME_MAX_CHARS, UpdateCategory};
use crate::domain::error::{AppError, AppResult};
use crate::domain::repository::CategoryRepository;

#[async_trait]
pub trait CategoryService: Send + Sync + 'static {
    async fn list(&self) -> AppResult<Vec<Category>>;
    async fn get(&self, id: CategoryId) -> AppResult<Category>;
    async fn create(&self, input: CreateCategory) -> AppResult<Category>;
    async fn update(&self, id: CategoryId, input: UpdateCategory) -> AppResult<Category>;
    /// Todos in the category are kept; their `category_id` becomes null.
    async fn delete(&self, id: CategoryId) -> AppResult<()>;
}

#[derive(Clone)]
pub struct CategoryServiceImpl<C: CategoryRepository> {
    repo: C,
}

impl<C: CategoryRepository> CategoryServiceImpl<C> {
    pub fn new(repo: C) -> Self { Self { repo } }
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(AppError::validation(format!("name must be at most {NAME_MAX_CHARS} characters")));
    }
    Ok(name.to_string())
}

#[async_trait]
impl<C: CategoryRepository> CategoryService for CategoryServiceImpl<C> {
    async fn list(&self) -> AppResult<Vec<Category>> { self.repo.list().await }

    async fn get(&self, id: CategoryId) -> AppResult<Category> {
        self.repo.get(id).await?.ok_or(AppError::NotFound("Category"))
    }

    async fn create(&self, input: CreateCategory) -> AppResult<Category> {
        let name = normalize_name(&input.name)?;
        self.repo.create(name).await
    }

    async fn update(&self, id: CategoryId, input: UpdateCategory) -> AppResult<Category> {
        let name = normalize_name(&input.name)?;
        self.repo.update(id, name).await?.ok_or(AppError::NotFound("Category"))
    }

    async fn delete(&self, id: CategoryId) -> AppResult<()> {
        if self.repo.delete(id).await? { Ok(()) } else { Err(AppError::NotFound("Category")) }
    }
}
