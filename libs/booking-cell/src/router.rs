use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn booking_routes(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/booking", post(handlers::create_booking));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/booking", get(handlers::list_bookings))
        .route(
            "/booking/{id}",
            get(handlers::get_booking).patch(handlers::confirm_payment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
