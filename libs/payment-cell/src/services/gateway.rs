use async_trait::async_trait;

use crate::models::PaymentError;

/// Payment processor boundary: creates a payment intent and hands back
/// the client secret the browser uses to confirm the card payment.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<String, PaymentError>;
}
