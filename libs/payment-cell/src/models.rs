use serde::{Deserialize, Serialize};
use tracing::error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl CreatePaymentIntentRequest {
    /// Amount in minor currency units (cents for `usd`).
    pub fn amount_minor(&self) -> Result<i64, AppError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AppError::BadRequest("price must be a positive number".to_string()));
        }

        Ok((self.price * 100.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Subset of the processor's payment intent object that we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment processor not configured")]
    NotConfigured,

    #[error("Payment processor API error: {message}")]
    Api { message: String },

    #[error("Payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        error!("Payment gateway failure: {}", err);
        match err {
            PaymentError::NotConfigured => AppError::Internal(err.to_string()),
            PaymentError::Api { .. } | PaymentError::Http(_) => {
                AppError::ExternalService(err.to_string())
            }
        }
    }
}
