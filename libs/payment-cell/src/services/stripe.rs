use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{PaymentError, StripePaymentIntent};
use crate::services::gateway::PaymentGateway;

/// Stripe REST client. Only the payment intent endpoint is used.
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            base_url: config.stripe_api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    /// POST /payment_intents
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<String, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let url = format!("{}/payment_intents", self.base_url);
        debug!("Creating payment intent for {} {} at {}", amount_minor, currency, url);

        let amount = amount_minor.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Payment intent creation failed: {} - {}", status, response_text);
            return Err(PaymentError::Api {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let intent: StripePaymentIntent = serde_json::from_str(&response_text)
            .map_err(|e| PaymentError::Api {
                message: format!("Failed to parse payment intent: {}", e),
            })?;

        info!("Created payment intent {}", intent.id);
        Ok(intent.client_secret)
    }
}
