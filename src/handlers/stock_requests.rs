use super::common::{created_response, map_service_error, success_response};
use crate::{
    auth::AuthContext,
    entities::{stock_requests::StockRequestStatus, users::StaffRole},
    errors::ApiError,
    handlers::AppState,
    services::stock_requests::StockRequestItemInput,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CreateStockRequest {
    pub items: Vec<StockRequestItemInput>,
    pub remarks: Option<String>,
}

/// Pharmacist raises a replenishment request for their store.
async fn create_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, store_id) = ctx
        .require_store_role(StaffRole::Pharmacist)
        .map_err(map_service_error)?;
    let request = state
        .services
        .stock_requests
        .create_request(store_id, user_id, payload.items, payload.remarks)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(request))
}

#[derive(Debug, Deserialize)]
pub struct StockRequestQuery {
    pub status: Option<StockRequestStatus>,
}

/// The store's requests, filterable by status. Both branch roles can read.
async fn list_requests(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<StockRequestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role_in(&[StaffRole::Manager, StaffRole::Pharmacist])
        .map_err(map_service_error)?;
    let requests = state
        .services
        .stock_requests
        .find_by_status(store_id, query.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(requests))
}

async fn approve_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(request_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (manager_id, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let request = state
        .services
        .stock_requests
        .approve(store_id, manager_id, request_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

#[derive(Debug, Deserialize)]
pub struct RejectStockRequest {
    pub remarks: Option<String>,
}

async fn reject_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(request_id): Path<i32>,
    Json(payload): Json<RejectStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (manager_id, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let request = state
        .services
        .stock_requests
        .reject(store_id, manager_id, request_id, payload.remarks)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

async fn fulfill_request(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(request_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let request = state
        .services
        .stock_requests
        .fulfill(store_id, request_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

pub fn stock_request_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_request))
        .route("/", get(list_requests))
        .route("/:id/approve", put(approve_request))
        .route("/:id/reject", put(reject_request))
        .route("/:id/fulfill", put(fulfill_request))
}
