use super::common::{created_response, map_service_error, success_response};
use crate::{
    auth::AuthContext,
    entities::users::StaffRole,
    errors::ApiError,
    handlers::AppState,
    services::stores::{CreateStaffUserInput, CreateStoreInput},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

async fn create_store(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateStoreInput>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let store = state
        .services
        .stores
        .create_store(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(store))
}

async fn list_stores(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let stores = state
        .services
        .stores
        .list_stores()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stores))
}

async fn create_staff_user(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateStaffUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let user = state
        .services
        .stores
        .create_staff_user(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(user))
}

async fn assign_manager(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path((store_id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let store = state
        .services
        .stores
        .assign_manager(store_id, user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(store))
}

async fn assign_pharmacist(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path((store_id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let store = state
        .services
        .stores
        .assign_pharmacist(store_id, user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(store))
}

/// Admin store and staff management, mounted under `/admin`.
pub fn store_admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stores", post(create_store))
        .route("/stores", get(list_stores))
        .route("/users", post(create_staff_user))
        .route("/stores/:store_id/manager/:user_id", put(assign_manager))
        .route(
            "/stores/:store_id/pharmacist/:user_id",
            put(assign_pharmacist),
        )
}
