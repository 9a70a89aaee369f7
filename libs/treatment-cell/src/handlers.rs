use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AvailabilityQuery, Treatment, TreatmentName};
use crate::services::TreatmentService;

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TreatmentName>>, AppError> {
    let service = TreatmentService::new(&state);

    let names = service.list_treatment_names().await?;

    Ok(Json(names))
}

#[axum::debug_handler]
pub async fn get_available(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<Treatment>>, AppError> {
    let date = query
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("date query parameter is required".to_string()))?;

    let service = TreatmentService::new(&state);
    let available = service.available_on(&date).await?;

    Ok(Json(available))
}
