use std::env;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CLUSTER: &str = "cluster0.pvs3o.mongodb.net";
pub const DEFAULT_DB_NAME: &str = "doctors_portal";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Which persistence backend the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    InMemory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub db_name: String,
    pub access_token_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub payment_currency: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT '{}' is not a valid port, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let store_backend = match env::var("DOCUMENT_STORE").as_deref() {
            Ok("memory") => StoreBackend::InMemory,
            Ok("mongodb") | Err(_) => StoreBackend::MongoDb,
            Ok(other) => {
                warn!("Unknown DOCUMENT_STORE '{}', using mongodb", other);
                StoreBackend::MongoDb
            }
        };

        let mongodb_uri = env::var("MONGODB_URI").unwrap_or_else(|_| {
            let user = env::var("DB_USER").unwrap_or_else(|_| {
                warn!("DB_USER not set, using empty value");
                String::new()
            });
            let pass = env::var("DB_PASS").unwrap_or_else(|_| {
                warn!("DB_PASS not set, using empty value");
                String::new()
            });
            let cluster = env::var("DB_CLUSTER").unwrap_or_else(|_| DEFAULT_CLUSTER.to_string());
            Self::atlas_uri(&user, &pass, &cluster)
        });

        let config = Self {
            port,
            store_backend,
            mongodb_uri,
            db_name: env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ACCESS_TOKEN_SECRET not set, using empty value");
                    String::new()
                }),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
            payment_currency: env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| "usd".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn atlas_uri(user: &str, pass: &str, cluster: &str) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            user, pass, cluster
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.access_token_secret.is_empty()
            && (self.store_backend == StoreBackend::InMemory || !self.mongodb_uri.is_empty())
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty() && !self.stripe_api_base.is_empty()
    }
}
