use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use tracing::debug;

use shared_models::{auth::Identity, error::AppError};
use shared_utils::AppJson;

use crate::models::{CreatePaymentIntentRequest, PaymentIntentResponse};
use crate::router::PaymentState;

#[axum::debug_handler]
pub async fn create_payment_intent(
    State(state): State<Arc<PaymentState>>,
    Extension(identity): Extension<Identity>,
    AppJson(request): AppJson<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount = request.amount_minor()?;
    let currency = request
        .currency
        .clone()
        .unwrap_or_else(|| state.app.config.payment_currency.clone());

    debug!("Payment intent requested by {}: {} {}", identity.email, amount, currency);

    let client_secret = state.gateway.create_payment_intent(amount, &currency).await?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}
