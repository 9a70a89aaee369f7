use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::router::booking_routes;
use doctor_cell::router::doctor_routes;
use payment_cell::{router::payment_routes, PaymentGateway};
use shared_utils::AppState;
use treatment_cell::router::treatment_routes;
use user_cell::router::user_routes;

pub fn create_router(state: Arc<AppState>, gateway: Arc<dyn PaymentGateway>) -> Router {
    Router::new()
        .route("/", get(|| async { "Doctors Portal server is running" }))
        .merge(treatment_routes(state.clone()))
        .merge(booking_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(payment_routes(state, gateway))
}
