use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;
use crate::services::PaymentGateway;

pub struct PaymentState {
    pub app: Arc<AppState>,
    pub gateway: Arc<dyn PaymentGateway>,
}

pub fn payment_routes(state: Arc<AppState>, gateway: Arc<dyn PaymentGateway>) -> Router {
    let payment_state = Arc::new(PaymentState {
        app: state.clone(),
        gateway,
    });

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(payment_state)
}
