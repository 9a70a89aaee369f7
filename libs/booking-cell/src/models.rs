use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shared_database::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use shared_models::error::AppError;

/// A patient's reservation of one slot of one treatment on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub treatment: String,
    pub date: String,
    pub patient: String,
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub treatment: String,
    pub date: String,
    pub patient: String,
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("treatment", &self.treatment),
            ("date", &self.date),
            ("patient", &self.patient),
            ("slot", &self.slot),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

/// `success: false` carries the booking that already holds the
/// (treatment, date, patient) triple.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<Booking>,
}

impl CreateBookingResponse {
    pub fn created(inserted_id: String) -> Self {
        Self {
            success: true,
            inserted_id: Some(inserted_id),
            existing: None,
        }
    }

    pub fn duplicate(existing: Booking) -> Self {
        Self {
            success: false,
            inserted_id: None,
            existing: Some(existing),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingQuery {
    pub patient: Option<String>,
}

/// Payment confirmation body; fields beyond `transactionId` are stored on the
/// payment record as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub transaction_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ConfirmPaymentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.transaction_id.trim().is_empty() {
            return Err(AppError::BadRequest("transactionId is required".to_string()));
        }
        Ok(())
    }
}
