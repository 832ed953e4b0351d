//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, tracing) and creates the axum
//! router ready for serving.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::db::repository::Stored;
use crate::models::{StatusFields, TodoFields, UserFields};

/// Collection and item routes for one resource.
///
/// Users have no single-item read; the other resources do.
fn resource<F: Stored>(collection: &str, item_get: bool) -> Router<AppState> {
    let item = format!("{}/{{id}}", collection);
    let mut item_routes = put(handlers::update::<F>).delete(handlers::delete::<F>);
    if item_get {
        item_routes = item_routes.get(handlers::get::<F>);
    }

    Router::new()
        .route(
            collection,
            get(handlers::list::<F>).post(handlers::create::<F>),
        )
        .route(&item, item_routes)
}

/// Create the main application router with all routes and middleware.
///
/// `base_path` (e.g. `/api/v1/master`) nests every route under it.
pub fn create_router(state: AppState, base_path: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .merge(resource::<UserFields>("/users", false))
        .merge(resource::<TodoFields>("/todos", true))
        .merge(resource::<StatusFields>("/status", true));

    let app = match base_path {
        Some(base) => Router::new().nest(base, api),
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let _root = create_router(AppState::new(repo.clone(), "en"), None);
        let _nested = create_router(AppState::new(repo, "en"), Some("/api/v1"));
    }
}
