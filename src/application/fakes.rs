use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::category::{Category, CategoryId, CategoryRef};
use crate::domain::error::{AppError, AppResult};
use crate::domain::query::TodoListQuery;
use crate::domain::repository::{CategoryRepository, TodoRepository};
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};

#[derive(Default)]
struct State {
    todos: HashMap<TodoId, Todo>,
    categories: BTreeMap<CategoryId, Category>,
    next_category: i64,
}

impl State {
    fn with_category(&self, mut todo: Todo) -> Todo {
        todo.category = todo.category_id.and_then(|id| self.categories.get(&id)).map(CategoryRef::from);
        todo
    }
}

/// Both repositories over one shared map, so category deletes reach todos.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl TodoRepository for InMemoryStore {
    async fn create(&self, input: CreateTodo) -> AppResult<Todo> {
        let now = Utc::now();
        let todo = Todo {
            id: TodoId::default(),
            title: input.title,
            completed: false,
            category_id: input.category_id,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            category: None,
        };
        let mut state = self.state.lock().unwrap();
        state.todos.insert(todo.id, todo.clone());
        Ok(state.with_category(todo))
    }

    async fn get(&self, id: TodoId) -> AppResult<Option<Todo>> {
        let state = self.state.lock().unwrap();
        Ok(state.todos.get(&id).cloned().map(|t| state.with_category(t)))
    }

    async fn list(&self, query: &TodoListQuery) -> AppResult<(Vec<Todo>, i64)> {
        let state = self.state.lock().unwrap();
        let f = &query.filter;
        let mut matched: Vec<Todo> = state
            .todos
            .values()
            .filter(|t| f.category_id.is_none_or(|c| t.category_id == Some(c)))
            .filter(|t| f.completed.is_none_or(|c| t.completed == c))
            .filter(|t| f.search.as_ref().is_none_or(|s| t.title.to_lowercase().contains(&s.to_lowercase())))
            .cloned()
            .map(|t| state.with_category(t))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(query.pagination.offset() as usize)
            .take(query.pagination.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> AppResult<Option<Todo>> {
        let mut state = self.state.lock().unwrap();
        let Some(todo) = state.todos.get_mut(&id) else { return Ok(None) };
        if let Some(t) = input.title { todo.title = t; }
        if let Some(c) = input.completed { todo.completed = c; }
        if let Some(c) = input.category_id { todo.category_id = c; }
        if let Some(d) = input.due_date { todo.due_date = d; }
        todo.updated_at = Utc::now();
        let todo = todo.clone();
        Ok(Some(state.with_category(todo)))
    }

    async fn toggle(&self, id: TodoId) -> AppResult<Option<Todo>> {
        let mut state = self.state.lock().unwrap();
        let Some(todo) = state.todos.get_mut(&id) else { return Ok(None) };
        todo.completed = !todo.completed;
        todo.updated_at = Utc::now();
        let todo = todo.clone();
        Ok(Some(state.with_category(todo)))
    }

    async fn delete(&self, id: TodoId) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().todos.remove(&id).is_some())
    }

    async fn exists(&self, id: TodoId) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().todos.contains_key(&id))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create(&self, name: String) -> AppResult<Category> {
        let mut state = self.state.lock().unwrap();
        if state.categories.values().any(|c| c.name == name) {
            return Err(AppError::Conflict(format!("category '{name}' already exists")));
        }
        state.next_category += 1;
        let now = Utc::now();
        let category = Category { id: CategoryId(state.next_category), name, created_at: now, updated_at: now };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get(&self, id: CategoryId) -> AppResult<Option<Category>> {
        Ok(self.state.lock().unwrap().categories.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.state.lock().unwrap().categories.values().cloned().collect())
    }

    async fn update(&self, id: CategoryId, name: String) -> AppResult<Option<Category>> {
        let mut state = self.state.lock().unwrap();
        if state.categories.values().any(|c| c.name == name && c.id != id) {
            return Err(AppError::Conflict(format!("category '{name}' already exists")));
        }
        let Some(category) = state.categories.get_mut(&id) else { return Ok(None) };
        category.name = name;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: CategoryId) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for todo in state.todos.values_mut().filter(|t| t.category_id == Some(id)) {
            todo.category_id = None;
        }
        Ok(true)
    }

    async fn exists(&self, id: CategoryId) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().categories.contains_key(&id))
    }
}
