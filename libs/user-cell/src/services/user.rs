use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use shared_database::{bson::doc, encode, DocumentStore, UpdateOutcome, USERS};
use shared_models::auth::is_admin_role;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;
use shared_utils::AppState;

use crate::models::{UpsertUserResponse, UserRecord, PROTECTED_FIELDS};

pub struct UserService {
    store: Arc<dyn DocumentStore>,
    jwt_secret: String,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            jwt_secret: state.config.access_token_secret.clone(),
        }
    }

    /// Creates or updates the profile keyed on `email` and issues a fresh
    /// access token for it. `role` and `_id` in the body are dropped.
    pub async fn upsert_user(
        &self,
        email: &str,
        mut profile: Map<String, Value>,
    ) -> Result<UpsertUserResponse, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::BadRequest("email is required".to_string()));
        }

        let token = issue_token(email, &self.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token issuance failed: {}", e)))?;

        for field in PROTECTED_FIELDS {
            if profile.remove(field).is_some() {
                debug!("Ignoring protected field '{}' in profile of {}", field, email);
            }
        }
        profile.insert("email".to_string(), Value::String(email.to_string()));

        let fields = encode(&profile)?;
        let result = self
            .store
            .collection(USERS)
            .update_one(doc! { "email": email }, doc! { "$set": fields }, true)
            .await?;

        info!("Upserted user {} (created: {})", email, result.upserted_count > 0);

        Ok(UpsertUserResponse { result, token })
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        let documents = self.store.collection(USERS).find(doc! {}, None).await?;

        documents.into_iter().map(UserRecord::from_document).collect()
    }

    pub async fn make_admin(&self, email: &str) -> Result<UpdateOutcome, AppError> {
        let result = self
            .store
            .collection(USERS)
            .update_one(doc! { "email": email }, doc! { "$set": { "role": "admin" } }, false)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("User {} not found", email)));
        }

        info!("Granted admin role to {}", email);
        Ok(result)
    }

    pub async fn is_admin(&self, email: &str) -> Result<bool, AppError> {
        let user = self
            .store
            .collection(USERS)
            .find_one(doc! { "email": email })
            .await?;

        Ok(is_admin_role(user.as_ref().and_then(|u| u.get_str("role").ok())))
    }
}
