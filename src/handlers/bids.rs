use super::common::{created_response, map_service_error, no_content_response, success_response};
use crate::{
    auth::AuthContext,
    errors::ApiError,
    handlers::AppState,
    services::bids::BidItemInput,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidRequest {
    pub rfq_id: i32,
    pub items: Vec<BidItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct BidItemsRequest {
    pub items: Vec<BidItemInput>,
}

async fn create_bid(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Json(payload): Json<CreateBidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let bid = state
        .services
        .bids
        .create_bid(vendor_id, payload.rfq_id, payload.items)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(bid))
}

async fn my_bids(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let bids = state
        .services
        .bids
        .list_vendor_bids(vendor_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(bids))
}

async fn update_bid_items(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(bid_id): Path<i32>,
    Json(payload): Json<BidItemsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    let bid = state
        .services
        .bids
        .update_bid_items(vendor_id, bid_id, payload.items)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(bid))
}

async fn delete_bid(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(bid_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor_id = ctx.require_vendor().map_err(map_service_error)?;
    state
        .services
        .bids
        .delete_bid(vendor_id, bid_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn bid_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_bid))
        .route("/mine", get(my_bids))
        .route("/:id/items", put(update_bid_items))
        .route("/:id", delete(delete_bid))
}
