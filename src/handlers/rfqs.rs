use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthContext,
    entities::users::StaffRole,
    errors::ApiError,
    handlers::AppState,
    services::rfqs::CreateRfqInput,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Create an RFQ for the manager's store.
async fn create_rfq(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateRfqInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let detail = state
        .services
        .rfqs
        .create_rfq(store_id, user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(detail))
}

/// The manager's own store's RFQs.
async fn list_store_rfqs(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let rfqs = state
        .services
        .rfqs
        .list_for_store(store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rfqs))
}

/// Every RFQ across stores; vendors browse these to find open solicitations.
async fn list_all_rfqs(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    // Vendors and admins both read the full list.
    if ctx.require_vendor().is_err() {
        ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
    }
    let rfqs = state
        .services
        .rfqs
        .list_all()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(rfqs))
}

async fn get_rfq(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(rfq_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    // Managers see only their store's RFQs; vendors and admins see any.
    let scope = match ctx.require_store_role(StaffRole::Manager) {
        Ok((_, store_id)) => Some(store_id),
        Err(_) => {
            if ctx.require_vendor().is_err() {
                ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
            }
            None
        }
    };
    let detail = state
        .services
        .rfqs
        .get_rfq(rfq_id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

async fn update_rfq(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(rfq_id): Path<i32>,
    Json(payload): Json<CreateRfqInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let detail = state
        .services
        .rfqs
        .update_rfq(store_id, rfq_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

async fn delete_rfq(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(rfq_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    state
        .services
        .rfqs
        .delete_rfq(store_id, rfq_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    pub winning_bid_id: i32,
}

/// Award the RFQ to one bid: the winner is accepted, all other bids are
/// rejected, and the RFQ closes.
async fn award_rfq(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(rfq_id): Path<i32>,
    Json(payload): Json<AwardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role(StaffRole::Manager)
        .map_err(map_service_error)?;
    let detail = state
        .services
        .rfqs
        .award(store_id, rfq_id, payload.winning_bid_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Bids submitted on one of the manager's RFQs.
async fn rfq_bids(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(rfq_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = match ctx.require_store_role(StaffRole::Manager) {
        Ok((_, store_id)) => Some(store_id),
        Err(_) => {
            ctx.require_role(StaffRole::Admin).map_err(map_service_error)?;
            None
        }
    };
    let bids = state
        .services
        .bids
        .get_bids_for_rfq(rfq_id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(bids))
}

/// Vendors that have won at least one of the store's RFQs.
async fn awarded_vendors(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let (_, store_id) = ctx
        .require_store_role_in(&[StaffRole::Manager, StaffRole::Pharmacist])
        .map_err(map_service_error)?;
    let vendors = state
        .services
        .rfqs
        .awarded_vendors(store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(vendors))
}

pub fn rfq_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_rfq))
        .route("/", get(list_store_rfqs))
        .route("/all", get(list_all_rfqs))
        .route("/awarded-vendors", get(awarded_vendors))
        .route("/:id", get(get_rfq))
        .route("/:id", put(update_rfq))
        .route("/:id", delete(delete_rfq))
        .route("/:id/award", post(award_rfq))
        .route("/:id/bids", get(rfq_bids))
}
