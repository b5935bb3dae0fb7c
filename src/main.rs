use todo_api::application::{category_service::CategoryServiceImpl, todo_service::TodoServiceImpl};
use todo_api::config::Config;
use todo_api::http::routing::{self, categories, todos};
use todo_api::infrastructure::{db::Database, sqlite_category_repo::SqliteCategoryRepository, sqlite_repo::SqliteTodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.migrate().await?;
    let category_repo = SqliteCategoryRepository::new(db.pool().clone());
    let todo_repo = SqliteTodoRepository::new(db.pool().clone());

    let todo_service = TodoServiceImpl::new(todo_repo, category_repo.clone());
    let category_service = CategoryServiceImpl::new(category_repo);
    let router = routing::app(
        todos::router(todos::AppState { service: todo_service })
            .merge(categories::router(categories::AppState { service: category_service })),
    );

    let addr = config.addr();
    tracing::info!(%addr, database_url = %config.database_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
