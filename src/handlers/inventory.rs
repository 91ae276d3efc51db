use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthContext,
    entities::users::StaffRole,
    errors::ApiError,
    handlers::AppState,
    services::inventory::ReceiveBatchInput,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Stand up the store's inventory. One per store; a second call conflicts.
async fn create_inventory(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let inventory = state
        .services
        .inventory
        .create_inventory(store_id)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(inventory))
}

/// Full stock picture for the caller's store.
async fn branch_inventory(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role_in(&[StaffRole::Manager, StaffRole::Pharmacist])
        .map_err(map_service_error)?;
    let view = state
        .services
        .inventory
        .get_branch_inventory_details(store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(view))
}

/// Record a delivered batch and its products into the store's inventory.
async fn receive_batch(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<ReceiveBatchInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Pharmacist)
        .map_err(map_service_error)?;
    let batch = state
        .services
        .inventory
        .create_batch_with_products(store_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(batch))
}

async fn get_batch(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(batch_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role_in(&[StaffRole::Manager, StaffRole::Pharmacist])
        .map_err(map_service_error)?;
    let batch = state
        .services
        .inventory
        .get_batch(store_id, batch_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batch))
}

async fn delete_batch(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(batch_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    state
        .services
        .inventory
        .delete_batch(store_id, batch_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize)]
pub struct DispenseRequest {
    pub quantity: i32,
}

/// Dispense stock to a customer. Fails whole when the on-hand count is short.
async fn dispense_product(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(product_id): Path<i32>,
    Json(payload): Json<DispenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Pharmacist)
        .map_err(map_service_error)?;
    let product = state
        .services
        .inventory
        .dispense_product(store_id, product_id, payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

pub fn inventory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_inventory))
        .route("/", get(branch_inventory))
        .route("/batches", post(receive_batch))
        .route("/batches/:id", get(get_batch))
        .route("/batches/:id", delete(delete_batch))
        .route("/products/:id/dispense", post(dispense_product))
}
