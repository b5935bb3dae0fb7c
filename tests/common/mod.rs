#![allow(dead_code)]

use axum::Router;
use axum::body::to_bytes;
use serde_json::Value;
use todo_api::application::{category_service::CategoryServiceImpl, todo_service::TodoServiceImpl};
use todo_api::http::routing::{self, categories, todos};
use todo_api::infrastructure::{db::Database, sqlite_category_repo::SqliteCategoryRepository, sqlite_repo::SqliteTodoRepository};

// use in-memory sqlite for tests
pub async fn app() -> Router {
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    db.migrate().await.unwrap();
    let category_repo = SqliteCategoryRepository::new(db.pool().clone());
    let todo_service = TodoServiceImpl::new(SqliteTodoRepository::new(db.pool().clone()), category_repo.clone());
    let category_service = CategoryServiceImpl::new(category_repo);
    routing::app(
        todos::router(todos::AppState { service: todo_service })
            .merge(categories::router(categories::AppState { service: category_service })),
    )
}

pub async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

/// Sends a request and returns the status with the parsed body (`Null` when empty).
pub async fn call(app: &Router, method: &str, path: &str, body: Option<Value>) -> (u16, Value) {
    let res = request(app, method, path, body).await;
    let status = res.status().as_u16();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

pub async fn create_category(app: &Router, name: &str) -> i64 {
    let (status, body) = call(app, "POST", "/categories", Some(serde_json::json!({ "name": name }))).await;
    assert_eq!(status, 201, "{body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_todo(app: &Router, payload: Value) -> String {
    let (status, body) = call(app, "POST", "/todos", Some(payload)).await;
    assert_eq!(status, 201, "{body}");
    body["id"].as_str().unwrap().to_string()
}
