use super::common::{created_response, map_service_error, success_response};
use crate::{
    auth::AuthContext,
    entities::users::StaffRole,
    errors::ApiError,
    handlers::AppState,
    services::vendors::{RegisterVendorInput, UploadDocumentInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

// Vendor self-service

/// Open registration endpoint; the account starts PENDING.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterVendorInput>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = state
        .services
        .vendors
        .register(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(vendor))
}

async fn my_profile(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let detail = state
        .services
        .vendors
        .get_vendor_detail(vendor_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<UploadDocumentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let document = state
        .services
        .vendors
        .upload_document(vendor_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(document))
}

async fn my_batches(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let batches = state
        .services
        .inventory
        .batches_by_vendor(vendor_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batches))
}

// Admin-side verification

#[derive(Debug, Deserialize)]
pub struct VendorListQuery {
    pub status: Option<String>,
}

async fn list_vendors(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(query): Query<VendorListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let vendors = state
        .services
        .vendors
        .list_vendors(query.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

async fn vendor_detail(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(vendor_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let detail = state
        .services
        .vendors
        .get_vendor_detail(vendor_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

#[derive(Debug, Deserialize)]
pub struct DocumentDecisionRequest {
    pub remarks: Option<String>,
}

/// Approval takes optional remarks; a missing body reads as none.
async fn approve_vendor(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(vendor_id): Path<i32>,
    payload: Option<Json<DocumentDecisionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let remarks = payload.and_then(|Json(p)| p.remarks);
    let vendor = state
        .services
        .vendors
        .approve_vendor(vendor_id, remarks)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

/// Rejection requires remarks; the service refuses blank ones.
async fn reject_vendor(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(vendor_id): Path<i32>,
    payload: Option<Json<DocumentDecisionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let remarks = payload.and_then(|Json(p)| p.remarks);
    let vendor = state
        .services
        .vendors
        .reject_vendor(vendor_id, remarks)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendor))
}

async fn verify_document(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(doc_id): Path<i32>,
    Json(payload): Json<DocumentDecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin_id = ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let document = state
        .services
        .vendors
        .verify_document(admin_id, doc_id, payload.remarks)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(document))
}

async fn reject_document(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(doc_id): Path<i32>,
    Json(payload): Json<DocumentDecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin_id = ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    let document = state
        .services
        .vendors
        .reject_document(admin_id, doc_id, payload.remarks)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(document))
}

/// Vendor-facing routes, mounted under `/vendors`.
pub fn vendor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/me", get(my_profile))
        .route("/documents", post(upload_document))
        .route("/batches", get(my_batches))
}

/// Admin verification routes, mounted under `/admin`.
pub fn vendor_admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vendors", get(list_vendors))
        .route("/vendors/:id", get(vendor_detail))
        .route("/vendors/:id/approve", put(approve_vendor))
        .route("/vendors/:id/reject", put(reject_vendor))
        .route("/documents/:id/verify", put(verify_document))
        .route("/documents/:id/reject", put(reject_document))
}
