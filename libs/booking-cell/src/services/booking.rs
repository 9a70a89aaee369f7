use std::sync::Arc;

use tracing::{debug, info};

use shared_database::{
    bson::{doc, oid::ObjectId},
    decode, decode_all, encode, parse_object_id, DocumentStore, UpdateOutcome, WriteOp,
    WriteOutcome, BOOKINGS, PAYMENTS,
};
use shared_models::auth::Identity;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{Booking, ConfirmPaymentRequest, CreateBookingRequest, CreateBookingResponse};

pub struct BookingService {
    store: Arc<dyn DocumentStore>,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates the booking unless the patient already holds one for the same
    /// treatment and date. The check and the insert are one conditional write.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreateBookingResponse, AppError> {
        request.validate()?;
        debug!(
            "Creating booking for {} on {} ({})",
            request.patient, request.date, request.treatment
        );

        let key = doc! {
            "treatment": request.treatment.as_str(),
            "date": request.date.as_str(),
            "patient": request.patient.as_str(),
        };

        let id = ObjectId::new();
        let mut document = encode(&request)?;
        document.insert("_id", id);

        let existing = self
            .store
            .collection(BOOKINGS)
            .insert_if_absent(key, document)
            .await?;

        match existing {
            Some(existing) => {
                let booking: Booking = decode(existing)?;
                info!("Duplicate booking request for {} on {}", booking.patient, booking.date);
                Ok(CreateBookingResponse::duplicate(booking))
            }
            None => {
                info!("Booking {} created", id);
                Ok(CreateBookingResponse::created(id.to_hex()))
            }
        }
    }

    /// Lists bookings of `patient`, which must be the caller's own email.
    pub async fn list_bookings_for_patient(
        &self,
        patient: &str,
        identity: &Identity,
    ) -> Result<Vec<Booking>, AppError> {
        if identity.email != patient {
            debug!("{} attempted to read bookings of {}", identity.email, patient);
            return Err(AppError::Forbidden("Forbidden access".to_string()));
        }

        let documents = self
            .store
            .collection(BOOKINGS)
            .find(doc! { "patient": patient }, None)
            .await?;

        Ok(decode_all(documents)?)
    }

    pub async fn bookings_on(&self, date: &str) -> Result<Vec<Booking>, AppError> {
        let documents = self
            .store
            .collection(BOOKINGS)
            .find(doc! { "date": date }, None)
            .await?;

        Ok(decode_all(documents)?)
    }

    pub async fn get_booking_by_id(&self, booking_id: &str) -> Result<Booking, AppError> {
        let id = parse_object_id(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let document = self
            .store
            .collection(BOOKINGS)
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        Ok(decode(document)?)
    }

    /// Records the payment and marks the booking paid in a single atomic batch.
    pub async fn confirm_payment(
        &self,
        booking_id: &str,
        payment: ConfirmPaymentRequest,
    ) -> Result<UpdateOutcome, AppError> {
        payment.validate()?;
        let booking = self.get_booking_by_id(booking_id).await?;

        let mut record = encode(&payment)?;
        record.remove("_id");
        record.insert("booking", booking.id.to_hex());

        let outcomes = self
            .store
            .write_atomically(vec![
                WriteOp::InsertOne {
                    collection: PAYMENTS,
                    document: record,
                },
                WriteOp::UpdateOne {
                    collection: BOOKINGS,
                    filter: doc! { "_id": booking.id },
                    update: doc! {
                        "$set": {
                            "paid": true,
                            "transactionId": payment.transaction_id.as_str(),
                        }
                    },
                },
            ])
            .await?;

        info!("Payment {} confirmed for booking {}", payment.transaction_id, booking.id);

        outcomes
            .into_iter()
            .find_map(|outcome| match outcome {
                WriteOutcome::Updated(update) => Some(update),
                WriteOutcome::Inserted(_) => None,
            })
            .ok_or_else(|| AppError::Internal("Booking update missing from payment batch".to_string()))
    }
}
