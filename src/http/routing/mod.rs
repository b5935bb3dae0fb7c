pub mod categories;
pub mod todos;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Serves the resource routes at the root and again under `/api`.
pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", router.clone())
        .merge(router)
        .layer(TraceLayer::new_for_http())
}
