use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use shared_config::{AppConfig, StoreBackend, DEFAULT_DB_NAME, DEFAULT_STRIPE_API_BASE};
use shared_database::{
    bson::{doc, Document},
    InMemoryStore,
};

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            stripe_secret_key: "sk_test_123".to_string(),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_stripe_base(mut self, base: &str) -> Self {
        self.stripe_api_base = base.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            port: 0,
            store_backend: StoreBackend::InMemory,
            mongodb_uri: String::new(),
            db_name: DEFAULT_DB_NAME.to_string(),
            access_token_secret: self.jwt_secret.clone(),
            stripe_secret_key: self.stripe_secret_key.clone(),
            stripe_api_base: self.stripe_api_base.clone(),
            payment_currency: "usd".to_string(),
        }
    }

    pub fn to_state(&self, store: InMemoryStore) -> Arc<AppState> {
        Arc::new(AppState::new(self.to_app_config(), Arc::new(store)))
    }
}

pub struct TestUser {
    pub email: String,
    pub role: Option<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            email: "test@example.com".to_string(),
            role: None,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            role: role.map(str::to_string),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, None)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Some("admin"))
    }

    pub fn to_document(&self) -> Document {
        let mut user = doc! { "email": self.email.as_str(), "name": "Test User" };
        if let Some(role) = &self.role {
            user.insert("role", role.as_str());
        }
        user
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(2));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "email": user.email,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(2))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct TestDocuments;

impl TestDocuments {
    pub fn service(name: &str, price: f64, slots: &[&str]) -> Document {
        doc! { "name": name, "price": price, "slots": slots }
    }

    pub fn booking(treatment: &str, date: &str, patient: &str, slot: &str) -> Document {
        doc! {
            "treatment": treatment,
            "date": date,
            "patient": patient,
            "slot": slot,
        }
    }

    pub fn doctor(name: &str, email: &str, specialty: &str) -> Document {
        doc! { "name": name, "email": email, "specialty": specialty }
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid test request")
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
