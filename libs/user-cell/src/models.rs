use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shared_database::bson::{Bson, Document};
use shared_database::{id_to_string, UpdateOutcome};
use shared_models::error::AppError;

/// Fields a client may never set through the profile upsert.
pub const PROTECTED_FIELDS: [&str; 2] = ["_id", "role"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    /// Splits a stored user into its key fields and free-form profile.
    pub fn from_document(mut document: Document) -> Result<Self, AppError> {
        let id = document
            .remove("_id")
            .map(|id| id_to_string(&id))
            .unwrap_or_default();
        let email = match document.remove("email") {
            Some(Bson::String(email)) => email,
            _ => return Err(AppError::Internal(format!("User {} has no email", id))),
        };
        let role = match document.remove("role") {
            Some(Bson::String(role)) => Some(role),
            _ => None,
        };
        let profile = document
            .into_iter()
            .map(|(key, value)| (key, value.into_relaxed_extjson()))
            .collect();

        Ok(Self {
            id,
            email,
            role,
            profile,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertUserResponse {
    pub result: UpdateOutcome,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}
