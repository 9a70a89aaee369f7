use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use shared_database::UpdateOutcome;
use shared_models::auth::Identity;
use shared_models::error::AppError;
use shared_utils::{AppJson, AppState};

use crate::models::{
    Booking, BookingQuery, ConfirmPaymentRequest, CreateBookingRequest, CreateBookingResponse,
};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let service = BookingService::new(&state);

    let response = service.create_booking(request).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let patient = query
        .patient
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("patient query parameter is required".to_string()))?;

    let service = BookingService::new(&state);
    let bookings = service.list_bookings_for_patient(&patient, &identity).await?;

    Ok(Json(bookings))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let service = BookingService::new(&state);

    let booking = service.get_booking_by_id(&booking_id).await?;

    Ok(Json(booking))
}

#[axum::debug_handler]
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    AppJson(request): AppJson<ConfirmPaymentRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let service = BookingService::new(&state);

    let outcome = service.confirm_payment(&booking_id, request).await?;

    Ok(Json(outcome))
}
