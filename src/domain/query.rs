use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::category::CategoryId;
use super::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField { CreatedAt, UpdatedAt, Title, DueDate, Completed }

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::DueDate => "due_date",
            SortField::Completed => "completed",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "due_date" => Ok(SortField::DueDate),
            "completed" => Ok(SortField::Completed),
            other => Err(AppError::validation(format!("cannot sort by '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection { Asc, Desc }

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self { SortDirection::Asc => "ASC", SortDirection::Desc => "DESC" }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(AppError::validation(format!("invalid sort direction '{s}'"))),
        }
    }
}

/// `field:direction`, e.g. `title:asc`. A bare field sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self { Self { field: SortField::CreatedAt, direction: SortDirection::Desc } }
}

impl FromStr for Sort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, direction.parse::<SortDirection>()?),
            None => (s, SortDirection::Desc),
        };
        Ok(Self { field: field.trim().parse::<SortField>()?, direction })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Non-positive values fall back to the defaults; `limit` is capped at `MAX_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 { (self.page - 1).saturating_mul(self.limit) }

    pub fn pages(&self, total: i64) -> i64 {
        if total <= 0 { 0 } else { (total + self.limit - 1) / self.limit }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self::new(None, None) }
}

/// All set criteria are ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub filter: TodoFilter,
    pub sort: Sort,
    pub pagination: Pagination,
}

/// Raw list query string, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub completed: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

impl TryFrom<ListParams> for TodoListQuery {
    type Error = AppError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let category_id = given(params.category_id)
            .map(|v| CategoryId::parse(&v).ok_or_else(|| AppError::validation(format!("invalid category_id '{v}'"))))
            .transpose()?;
        let completed = given(params.completed)
            .map(|v| match v.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(AppError::validation(format!("completed must be true or false, got '{v}'"))),
            })
            .transpose()?;
        let page = given(params.page).map(|v| integer("page", &v)).transpose()?;
        let limit = given(params.limit).map(|v| integer("limit", &v)).transpose()?;
        let sort = given(params.sort).map(|v| v.parse::<Sort>()).transpose()?.unwrap_or_default();

        Ok(Self {
            filter: TodoFilter { category_id, search: given(params.search), completed },
            sort,
            pagination: Pagination::new(page, limit),
        })
    }
}

fn given(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn integer(name: &str, value: &str) -> Result<i64, AppError> {
    value.trim().parse().map_err(|_| AppError::validation(format!("{name} must be an integer, got '{value}'")))
}

/// One page of a list plus what the caller needs to walk the rest.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self { items, total, page: pagination.page, limit: pagination.limit, pages: pagination.pages(total) }
    }
}
