use std::sync::Arc;

use tracing::debug;

use booking_cell::BookingService;
use shared_database::{bson::doc, decode_all, DocumentStore, SERVICES};
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{Treatment, TreatmentName};
use crate::services::availability::compute_availability;

pub struct TreatmentService {
    store: Arc<dyn DocumentStore>,
}

impl TreatmentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_treatment_names(&self) -> Result<Vec<TreatmentName>, AppError> {
        let documents = self
            .store
            .collection(SERVICES)
            .find(doc! {}, Some(doc! { "name": 1 }))
            .await?;

        Ok(decode_all(documents)?)
    }

    pub async fn list_treatments(&self) -> Result<Vec<Treatment>, AppError> {
        let documents = self.store.collection(SERVICES).find(doc! {}, None).await?;

        Ok(decode_all(documents)?)
    }

    /// Every treatment with the slots still open on `date`.
    pub async fn available_on(&self, date: &str) -> Result<Vec<Treatment>, AppError> {
        debug!("Computing availability for {}", date);

        let treatments = self.list_treatments().await?;
        let bookings = BookingService::with_store(self.store.clone())
            .bookings_on(date)
            .await?;

        debug!(
            "{} treatments, {} bookings on {}",
            treatments.len(),
            bookings.len(),
            date
        );

        Ok(compute_availability(&treatments, &bookings))
    }
}
