use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::category::{CategoryId, CategoryRef};

pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub Uuid);

impl TodoId {
    /// Parses a path segment; anything that is not a UUID cannot name a todo.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for TodoId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub category_id: Option<CategoryId>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<CategoryId>,
    #[serde(default, alias = "dueDate", deserialize_with = "due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. For `category_id` and `due_date` the outer `Option` is
/// "key present", the inner one is the value, so `null` clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, alias = "categoryId", deserialize_with = "present")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default, alias = "dueDate", deserialize_with = "present_due_date")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.category_id.is_none() && self.due_date.is_none()
    }
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_due_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = s.parse::<DateTime<Utc>>() {
        return Some(t);
    }
    let day = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    day.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
}

fn due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_due_date(&s).ok_or_else(|| de::Error::custom(format!("invalid due_date '{s}'"))))
        .transpose()
}

fn present_due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error> {
    due_date(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let cleared: UpdateTodo = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));
        assert!(!cleared.is_empty());

        let absent: UpdateTodo = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.category_id, None);
        assert_eq!(absent.due_date, None);

        let empty: UpdateTodo = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let input: CreateTodo = serde_json::from_str(r#"{"title": "Buy milk", "categoryId": 3, "dueDate": "2025-01-02T03:04:05Z"}"#).unwrap();
        assert_eq!(input.category_id, Some(CategoryId(3)));
        assert!(input.due_date.is_some());

        let update: UpdateTodo = serde_json::from_str(r#"{"categoryId": 4}"#).unwrap();
        assert_eq!(update.category_id, Some(Some(CategoryId(4))));
    }

    #[test]
    fn due_date_accepts_plain_dates() {
        let midnight = "2025-12-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let input: CreateTodo = serde_json::from_str(r#"{"title": "Pay rent", "due_date": "2025-12-31"}"#).unwrap();
        assert_eq!(input.due_date, Some(midnight));

        let update: UpdateTodo = serde_json::from_str(r#"{"dueDate": "2025-12-31"}"#).unwrap();
        assert_eq!(update.due_date, Some(Some(midnight)));

        let cleared: UpdateTodo = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        assert_eq!(parse_due_date("2025-12-31T10:00:00+02:00"), "2025-12-31T08:00:00Z".parse::<DateTime<Utc>>().ok());
        for bad in ["2025-13-01", "31/12/2025", "tomorrow"] {
            assert!(parse_due_date(bad).is_none(), "{bad}");
            assert!(serde_json::from_str::<CreateTodo>(&format!(r#"{{"title": "ab", "due_date": "{bad}"}}"#)).is_err());
        }
    }
}
