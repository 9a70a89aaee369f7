use std::sync::Arc;

use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn treatment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/service", get(handlers::list_services))
        .route("/available", get(handlers::get_available))
        .with_state(state)
}
