use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use shared_database::UpdateOutcome;
use shared_models::error::AppError;
use shared_utils::{AppJson, AppState};

use crate::models::{AdminStatus, UpsertUserResponse, UserRecord};
use crate::services::UserService;

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    let service = UserService::new(&state);

    let users = service.list_users().await?;

    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    AppJson(profile): AppJson<Map<String, Value>>,
) -> Result<Json<UpsertUserResponse>, AppError> {
    let service = UserService::new(&state);

    let response = service.upsert_user(&email, profile).await?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn make_admin(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let service = UserService::new(&state);

    let outcome = service.make_admin(&email).await?;

    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn check_admin(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    let service = UserService::new(&state);

    let admin = service.is_admin(&email).await?;

    Ok(Json(AdminStatus { admin }))
}
