use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use payment_cell::{payment_routes, PaymentError, PaymentGateway};
use shared_database::InMemoryStore;
use shared_utils::test_utils::{json_request, read_json, JwtTestUtils, TestConfig, TestUser};

#[derive(Default)]
struct RecordingGateway {
    calls: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<String, PaymentError> {
        self.calls.lock().unwrap().push((amount_minor, currency.to_string()));
        if self.fail {
            return Err(PaymentError::Api {
                message: "HTTP 500: processor down".to_string(),
            });
        }
        Ok(format!("secret_{}", amount_minor))
    }
}

#[tokio::test]
async fn test_payment_intent_requires_token() {
    let config = TestConfig::default();
    let gateway = Arc::new(RecordingGateway::default());
    let app = payment_routes(config.to_state(InMemoryStore::new()), gateway.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-payment-intent",
            None,
            Some(json!({ "price": 120 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(gateway.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_intent_converts_price_to_minor_units() {
    let config = TestConfig::default();
    let gateway = Arc::new(RecordingGateway::default());
    let app = payment_routes(config.to_state(InMemoryStore::new()), gateway.clone());
    let token = JwtTestUtils::create_test_token(&TestUser::patient("alice@x.com"), &config.jwt_secret, None);

    let (status, body) = read_json(
        app.oneshot(json_request(
            "POST",
            "/create-payment-intent",
            Some(&token),
            Some(json!({ "price": 120.5 })),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "clientSecret": "secret_12050" }));
    assert_eq!(*gateway.calls.lock().unwrap(), vec![(12050, "usd".to_string())]);
}

#[tokio::test]
async fn test_payment_intent_rejects_zero_price() {
    let config = TestConfig::default();
    let gateway = Arc::new(RecordingGateway::default());
    let app = payment_routes(config.to_state(InMemoryStore::new()), gateway.clone());
    let token = JwtTestUtils::create_test_token(&TestUser::patient("alice@x.com"), &config.jwt_secret, None);

    let response = app
        .oneshot(json_request(
            "POST",
            "/create-payment-intent",
            Some(&token),
            Some(json!({ "price": 0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_gateway_failure_maps_to_bad_gateway() {
    let config = TestConfig::default();
    let gateway = Arc::new(RecordingGateway {
        fail: true,
        ..Default::default()
    });
    let app = payment_routes(config.to_state(InMemoryStore::new()), gateway);
    let token = JwtTestUtils::create_test_token(&TestUser::patient("alice@x.com"), &config.jwt_secret, None);

    let (status, body) = read_json(
        app.oneshot(json_request(
            "POST",
            "/create-payment-intent",
            Some(&token),
            Some(json!({ "price": 50, "currency": "eur" })),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream service error");
}
