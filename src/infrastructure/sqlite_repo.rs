use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::db::{decode_time, encode_time, is_foreign_key_violation};
use crate::domain::{
    category::{CategoryId, CategoryRef},
    error::{AppError, AppResult},
    query::{SortField, TodoFilter, TodoListQuery},
    repository::TodoRepository,
    todo::{CreateTodo, Todo, TodoId, UpdateTodo},
};

const SELECT_TODO: &str = "SELECT t.id, t.title, t.completed, t.category_id, t.due_date, t.created_at, t.updated_at, \
     c.name AS category_name \
     FROM todos t LEFT JOIN categories c ON c.id = t.category_id";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, input: CreateTodo) -> AppResult<Todo> {
        let now = encode_time(Utc::now());
        let id = TodoId::default();
        sqlx::query(
            "INSERT INTO todos (id, title, title_search, completed, category_id, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?6)",
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(fold(&input.title))
        .bind(input.category_id.map(|c| c.0))
        .bind(input.due_date.map(encode_time))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| reference_error(e, input.category_id))?;
        tracing::debug!(%id, "inserted todo");
        // a concurrent delete between insert and read surfaces as not found
        self.get(id).await?.ok_or(AppError::NotFound("Todo"))
    }

    async fn get(&self, id: TodoId) -> AppResult<Option<Todo>> {
        let row = sqlx::query(&format!("{SELECT_TODO} WHERE t.id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_todo).transpose()?)
    }

    async fn list(&self, query: &TodoListQuery) -> AppResult<(Vec<Todo>, i64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM todos t");
        push_filter(&mut count, &query.filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_TODO);
        push_filter(&mut select, &query.filter);
        let column = match query.sort.field {
            SortField::Title => "title_search",
            field => field.column(),
        };
        let dir = query.sort.direction.keyword();
        // id breaks ties so pages never overlap
        select.push(format!(" ORDER BY t.{column} {dir}, t.id {dir}"));
        select.push(" LIMIT ").push_bind(query.pagination.limit);
        select.push(" OFFSET ").push_bind(query.pagination.offset());

        let rows = select.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(row_to_todo).collect::<anyhow::Result<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Writes only the fields present in `input`, so a concurrent toggle or
    /// category detach is never overwritten with a stale value.
    async fn update(&self, id: TodoId, input: UpdateTodo) -> AppResult<Option<Todo>> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE todos SET ");
        let mut set = qb.separated(", ");
        if let Some(title) = &input.title {
            set.push("title = ").push_bind_unseparated(title.clone());
            set.push("title_search = ").push_bind_unseparated(fold(title));
        }
        if let Some(completed) = input.completed {
            set.push("completed = ").push_bind_unseparated(completed);
        }
        if let Some(category_id) = input.category_id {
            set.push("category_id = ").push_bind_unseparated(category_id.map(|c| c.0));
        }
        if let Some(due_date) = input.due_date {
            set.push("due_date = ").push_bind_unseparated(due_date.map(encode_time));
        }
        set.push("updated_at = ").push_bind_unseparated(encode_time(Utc::now()));
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| reference_error(e, input.category_id.flatten()))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn toggle(&self, id: TodoId) -> AppResult<Option<Todo>> {
        let result = sqlx::query("UPDATE todos SET completed = NOT completed, updated_at = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(encode_time(Utc::now()))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: TodoId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: TodoId) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM todos WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TodoFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(category_id) = filter.category_id {
        qb.push(" AND t.category_id = ").push_bind(category_id.0);
    }
    if let Some(completed) = filter.completed {
        qb.push(" AND t.completed = ").push_bind(completed);
    }
    if let Some(search) = &filter.search {
        // LIKE only folds ASCII, so match against the pre-folded column
        qb.push(" AND t.title_search LIKE ")
            .push_bind(format!("%{}%", escape_like(&fold(search))))
            .push(" ESCAPE '\\'");
    }
}

fn fold(title: &str) -> String {
    title.to_lowercase()
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn reference_error(err: sqlx::Error, category_id: Option<CategoryId>) -> AppError {
    match category_id {
        Some(id) if is_foreign_key_violation(&err) => AppError::CategoryNotFound(id),
        _ => err.into(),
    }
}

fn row_to_todo(row: &SqliteRow) -> anyhow::Result<Todo> {
    let id_str: String = row.try_get("id")?;
    let category_id: Option<i64> = row.try_get("category_id")?;
    let category_name: Option<String> = row.try_get("category_name")?;
    let due_date: Option<String> = row.try_get("due_date")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let category = match (category_id, category_name) {
        (Some(id), Some(name)) => Some(CategoryRef { id: CategoryId(id), name }),
        _ => None,
    };

    Ok(Todo {
        id: TodoId(Uuid::parse_str(&id_str)?),
        title: row.try_get("title")?,
        completed: row.try_get("completed")?,
        category_id: category_id.map(CategoryId),
        due_date: due_date.as_deref().map(decode_time).transpose()?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
        category,
    })
}
