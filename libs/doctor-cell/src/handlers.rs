use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use shared_database::{DeleteOutcome, InsertOutcome};
use shared_models::error::AppError;
use shared_utils::{AppJson, AppState};

use crate::models::{CreateDoctorRequest, Doctor};
use crate::services::DoctorService;

// ==============================================================================
// ADMIN HANDLERS (token + admin role, enforced by the router)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.list_doctors().await?;

    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateDoctorRequest>,
) -> Result<Json<InsertOutcome>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let outcome = doctor_service.add_doctor(request).await?;

    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn remove_doctor(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<DeleteOutcome>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let outcome = doctor_service.remove_doctor(&email).await?;

    Ok(Json(outcome))
}
