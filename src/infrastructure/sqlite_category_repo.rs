use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use super::db::{decode_time, encode_time};
use crate::domain::{
    category::{Category, CategoryId},
    error::{AppError, AppResult},
    repository::CategoryRepository,
};

#[derive(Clone)]
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, name: String) -> AppResult<Category> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?2)")
            .bind(&name)
            .bind(encode_time(now))
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_name(e, &name))?;
        let id = CategoryId(result.last_insert_rowid());
        tracing::debug!(%id, name = %name, "inserted category");
        Ok(Category { id, name, created_at: now, updated_at: now })
    }

    async fn get(&self, id: CategoryId) -> AppResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM categories WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_category).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, created_at, updated_at FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_category).collect::<anyhow::Result<Vec<_>>>()?)
    }

    async fn update(&self, id: CategoryId, name: String) -> AppResult<Option<Category>> {
        let result = sqlx::query("UPDATE categories SET name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id.0)
            .bind(&name)
            .bind(encode_time(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_name(e, &name))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Referencing todos are detached by `ON DELETE SET NULL`.
    async fn delete(&self, id: CategoryId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: CategoryId) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn duplicate_name(err: sqlx::Error, name: &str) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::Conflict(format!("category '{name}' already exists")),
        other => other,
    }
}

fn row_to_category(row: &SqliteRow) -> anyhow::Result<Category> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Category {
        id: CategoryId(row.try_get("id")?),
        name: row.try_get("name")?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}
