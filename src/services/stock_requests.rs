use crate::{
    db::DbPool,
    entities::{
        stock_request_items,
        stock_requests::{self, StockRequestStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockRequestItemInput {
    #[validate(length(min = 1, max = 255))]
    pub medicine_name: String,
    #[validate(range(min = 1))]
    pub required_quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequestView {
    pub request_id: i32,
    pub store_id: i32,
    pub requested_by: i32,
    pub approved_by: Option<i32>,
    pub status: StockRequestStatus,
    pub remarks: Option<String>,
    pub items: Vec<stock_request_items::Model>,
}

impl StockRequestView {
    fn assemble(request: stock_requests::Model, items: Vec<stock_request_items::Model>) -> Self {
        Self {
            request_id: request.id,
            store_id: request.store_id,
            requested_by: request.requested_by,
            approved_by: request.approved_by,
            status: request.status,
            remarks: request.remarks,
            items,
        }
    }
}

/// Service for the pharmacist-to-manager stock replenishment workflow.
#[derive(Clone)]
pub struct StockRequestService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockRequestService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a PENDING request for the pharmacist's store.
    #[instrument(skip(self, items))]
    pub async fn create_request(
        &self,
        store_id: i32,
        requested_by: i32,
        items: Vec<StockRequestItemInput>,
        remarks: Option<String>,
    ) -> Result<StockRequestView, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A stock request needs at least one item".to_string(),
            ));
        }
        for item in &items {
            item.validate()?;
        }

        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let request = stock_requests::ActiveModel {
            store_id: Set(store_id),
            requested_by: Set(requested_by),
            status: Set(StockRequestStatus::Pending),
            remarks: Set(remarks),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let model = stock_request_items::ActiveModel {
                stock_request_id: Set(request.id),
                medicine_name: Set(item.medicine_name),
                required_quantity: Set(item.required_quantity),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            inserted.push(model);
        }

        txn.commit().await?;

        info!(request_id = request.id, store_id, "stock request created");
        self.publish(Event::StockRequestCreated {
            request_id: request.id,
            store_id,
        })
        .await;

        Ok(StockRequestView::assemble(request, inserted))
    }

    /// Lists the store's requests, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn find_by_status(
        &self,
        store_id: i32,
        status: Option<StockRequestStatus>,
    ) -> Result<Vec<StockRequestView>, ServiceError> {
        let mut query = stock_requests::Entity::find()
            .filter(stock_requests::Column::StoreId.eq(store_id));
        if let Some(status) = status {
            query = query.filter(stock_requests::Column::Status.eq(status));
        }
        let rows = query
            .find_with_related(stock_request_items::Entity)
            .order_by_asc(stock_requests::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(request, items)| StockRequestView::assemble(request, items))
            .collect())
    }

    /// Approves a pending request, recording the deciding manager.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        store_id: i32,
        manager_id: i32,
        request_id: i32,
    ) -> Result<StockRequestView, ServiceError> {
        let view = self
            .decide(store_id, manager_id, request_id, StockRequestStatus::Approved, None)
            .await?;
        self.publish(Event::StockRequestApproved {
            request_id,
            approved_by: manager_id,
        })
        .await;
        Ok(view)
    }

    /// Rejects a pending request with optional remarks.
    #[instrument(skip(self))]
    pub async fn reject(
        &self,
        store_id: i32,
        manager_id: i32,
        request_id: i32,
        remarks: Option<String>,
    ) -> Result<StockRequestView, ServiceError> {
        let view = self
            .decide(store_id, manager_id, request_id, StockRequestStatus::Rejected, remarks)
            .await?;
        self.publish(Event::StockRequestRejected {
            request_id,
            approved_by: manager_id,
        })
        .await;
        Ok(view)
    }

    /// Marks an approved request as fulfilled once the stock has arrived.
    #[instrument(skip(self))]
    pub async fn fulfill(
        &self,
        store_id: i32,
        request_id: i32,
    ) -> Result<StockRequestView, ServiceError> {
        let request = self.load_scoped(&*self.db_pool, store_id, request_id).await?;
        if request.status != StockRequestStatus::Approved {
            return Err(ServiceError::Conflict(
                "Only approved requests can be fulfilled".to_string(),
            ));
        }

        let mut active: stock_requests::ActiveModel = request.into();
        active.status = Set(StockRequestStatus::Fulfilled);
        active.updated_at = Set(Utc::now());
        let request = active.update(&*self.db_pool).await?;

        self.publish(Event::StockRequestFulfilled { request_id })
            .await;

        let items = self.items_of(request.id).await?;
        Ok(StockRequestView::assemble(request, items))
    }

    /// The mutation is already committed when events go out; a delivery
    /// failure is logged rather than surfaced as an error.
    async fn publish(&self, event: Event) {
        if let Err(err) = self.event_sender.send(event).await {
            warn!(error = %err, "event delivery failed");
        }
    }

    async fn decide(
        &self,
        store_id: i32,
        manager_id: i32,
        request_id: i32,
        status: StockRequestStatus,
        remarks: Option<String>,
    ) -> Result<StockRequestView, ServiceError> {
        let request = self.load_scoped(&*self.db_pool, store_id, request_id).await?;
        if request.status != StockRequestStatus::Pending {
            return Err(ServiceError::Conflict(
                "Stock request has already been decided".to_string(),
            ));
        }

        let mut active: stock_requests::ActiveModel = request.into();
        active.status = Set(status);
        active.approved_by = Set(Some(manager_id));
        if remarks.is_some() {
            active.remarks = Set(remarks);
        }
        active.updated_at = Set(Utc::now());
        let request = active.update(&*self.db_pool).await?;

        let items = self.items_of(request.id).await?;
        Ok(StockRequestView::assemble(request, items))
    }

    async fn load_scoped<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: i32,
        request_id: i32,
    ) -> Result<stock_requests::Model, ServiceError> {
        // Lookup is by (id, store) so foreign requests read as absent.
        stock_requests::Entity::find_by_id(request_id)
            .filter(stock_requests::Column::StoreId.eq(store_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Stock request {} not found", request_id))
            })
    }

    async fn items_of(
        &self,
        request_id: i32,
    ) -> Result<Vec<stock_request_items::Model>, ServiceError> {
        Ok(stock_request_items::Entity::find()
            .filter(stock_request_items::Column::StockRequestId.eq(request_id))
            .order_by_asc(stock_request_items::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }
}
