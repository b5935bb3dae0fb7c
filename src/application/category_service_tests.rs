#[cfg(test)]
mod tests {
    use super::super::category_service::{CategoryService, CategoryServiceImpl};
    use super::super::fakes::InMemoryStore;
    use super::super::todo_service::{TodoService, TodoServiceImpl};
    use crate::domain::category::{CategoryId, CreateCategory, UpdateCategory};
    use crate::domain::error::AppError;
    use crate::domain::todo::CreateTodo;

    fn named(name: &str) -> CreateCategory { CreateCategory { name: name.into() } }

    #[tokio::test]
    async fn create_trims_and_requires_name() {
        let service = CategoryServiceImpl::new(InMemoryStore::default());
        let work = service.create(named(" Work ")).await.unwrap();
        assert_eq!(work.name, "Work");
        assert_eq!(service.get(work.id).await.unwrap(), work);

        assert!(matches!(service.create(named("  ")).await, Err(AppError::Validation(_))));
        assert!(matches!(service.create(named(&"n".repeat(101))).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let service = CategoryServiceImpl::new(InMemoryStore::default());
        service.create(named("Work")).await.unwrap();
        assert!(matches!(service.create(named("Work")).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_name() {
        let service = CategoryServiceImpl::new(InMemoryStore::default());
        let work = service.create(named("Work")).await.unwrap();
        let renamed = service.update(work.id, UpdateCategory { name: "Office".into() }).await.unwrap();
        assert_eq!(renamed.name, "Office");
        assert!(matches!(
            service.update(CategoryId(99), UpdateCategory { name: "X".into() }).await,
            Err(AppError::NotFound("Category"))
        ));
    }

    #[tokio::test]
    async fn delete_detaches_todos() {
        let store = InMemoryStore::default();
        let categories = CategoryServiceImpl::new(store.clone());
        let todos = TodoServiceImpl::new(store.clone(), store);
        let work = categories.create(named("Work")).await.unwrap();
        let todo = todos
            .create(CreateTodo { title: "Buy milk".into(), category_id: Some(work.id), due_date: None })
            .await
            .unwrap();

        categories.delete(work.id).await.unwrap();
        let after = todos.get(todo.id).await.unwrap();
        assert_eq!(after.category_id, None);
        assert_eq!(after.category, None);

        assert!(matches!(categories.delete(work.id).await, Err(AppError::NotFound(_))));
    }
}
