use super::common::{map_service_error, success_response, validate_input};
use crate::{
    entities::users::StaffRole,
    errors::{ApiError, ServiceError},
    handlers::AppState,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLoginResponse {
    pub token: String,
    pub user_id: i32,
    pub name: String,
    pub role: StaffRole,
    pub store_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorLoginResponse {
    pub token: String,
    pub vendor_id: i32,
    pub business_name: String,
    pub status: crate::entities::vendors::VendorStatus,
}

/// Staff login. The token carries the role and, for branch staff, the bound
/// store so later requests need no store lookup.
async fn staff_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .stores
        .find_user_by_email(&payload.email)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::ServiceError(ServiceError::Unauthorized("Invalid credentials".to_string()))
        })?;
    if !state
        .auth
        .verify_password(&payload.password, &user.password_hash)
        .map_err(map_service_error)?
    {
        return Err(ApiError::ServiceError(ServiceError::Unauthorized(
            "Invalid credentials".to_string(),
        )));
    }

    let store_id = state
        .services
        .stores
        .store_for_user(user.id)
        .await
        .map_err(map_service_error)?
        .map(|store| store.id);

    let token = state
        .auth
        .issue_staff_token(user.id, user.role, store_id)
        .map_err(map_service_error)?;

    info!(user_id = user.id, "staff login");
    Ok(success_response(StaffLoginResponse {
        token,
        user_id: user.id,
        name: user.name,
        role: user.role,
        store_id,
    }))
}

/// Vendor login. Pending and rejected vendors can still log in to manage
/// their documents; bidding is gated separately on approval.
async fn vendor_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let vendor = state
        .services
        .vendors
        .find_by_email(&payload.email)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| {
            ApiError::ServiceError(ServiceError::Unauthorized("Invalid credentials".to_string()))
        })?;
    if !state
        .auth
        .verify_password(&payload.password, &vendor.password_hash)
        .map_err(map_service_error)?
    {
        return Err(ApiError::ServiceError(ServiceError::Unauthorized(
            "Invalid credentials".to_string(),
        )));
    }

    let token = state
        .auth
        .issue_vendor_token(vendor.id)
        .map_err(map_service_error)?;

    info!(vendor_id = vendor.id, "vendor login");
    Ok(success_response(VendorLoginResponse {
        token,
        vendor_id: vendor.id,
        business_name: vendor.business_name,
        status: vendor.status,
    }))
}

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/staff/login", post(staff_login))
        .route("/vendor/login", post(vendor_login))
}
