use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_database::{bson::doc, DocumentStore, USERS};
use shared_models::auth::{is_admin_role, Identity};
use shared_models::error::AppError;

use crate::jwt::validate_token;
use crate::state::AppState;

/// Pulls the token out of a `Bearer <token>` authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization header format".to_string()))
}

// Verifies the bearer token and stores the decoded identity in request extensions
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;

    let identity = validate_token(token, &state.config.access_token_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        AppError::Forbidden("Forbidden access".to_string())
    })?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Allows the request only when the stored user for `identity` has the admin role.
pub async fn verify_admin(store: &dyn DocumentStore, identity: &Identity) -> Result<(), AppError> {
    let user = store
        .collection(USERS)
        .find_one(doc! { "email": identity.email.as_str() })
        .await?;

    let role = user.as_ref().and_then(|u| u.get_str("role").ok());
    if !is_admin_role(role) {
        debug!("Admin check failed for {}", identity.email);
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }

    Ok(())
}

// Must be layered inside auth_middleware: it only trusts the decoded identity
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = extract_identity(&request)?;
    verify_admin(state.store.as_ref(), &identity).await?;

    Ok(next.run(request).await)
}

pub fn extract_identity<B>(request: &Request<B>) -> Result<Identity, AppError> {
    request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| AppError::Unauthenticated("Identity not found in request extensions".to_string()))
}
