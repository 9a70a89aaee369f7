use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use shared_utils::extractor::{admin_middleware, auth_middleware};
use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // Admin routes (token verified first, then the stored role)
    let admin_routes = Router::new()
        .route("/doctor", get(handlers::list_doctors).post(handlers::add_doctor))
        .route("/doctor/{email}", delete(handlers::remove_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(admin_routes)
        .with_state(state)
}
