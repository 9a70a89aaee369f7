use std::sync::Arc;

use tracing::{debug, info};

use shared_database::{
    bson::{doc, oid::ObjectId},
    decode_all, encode, DeleteOutcome, DocumentStore, InsertOutcome, DOCTORS,
};
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CreateDoctorRequest, Doctor};

pub struct DoctorService {
    store: Arc<dyn DocumentStore>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, AppError> {
        let documents = self.store.collection(DOCTORS).find(doc! {}, None).await?;

        Ok(decode_all(documents)?)
    }

    /// Add a doctor; the email must not already be registered.
    pub async fn add_doctor(&self, request: CreateDoctorRequest) -> Result<InsertOutcome, AppError> {
        request.validate()?;
        debug!("Adding doctor: {}", request.email);

        let id = ObjectId::new();
        let mut document = encode(&request)?;
        document.insert("_id", id);

        let existing = self
            .store
            .collection(DOCTORS)
            .insert_if_absent(doc! { "email": request.email.as_str() }, document)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Doctor with email {} already exists",
                request.email
            )));
        }

        info!("Doctor {} added", request.email);
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id.to_hex(),
        })
    }

    pub async fn remove_doctor(&self, email: &str) -> Result<DeleteOutcome, AppError> {
        let outcome = self
            .store
            .collection(DOCTORS)
            .delete_one(doc! { "email": email })
            .await?;

        if outcome.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Doctor {} not found", email)));
        }

        info!("Doctor {} removed", email);
        Ok(outcome)
    }
}
