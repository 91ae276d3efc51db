use crate::{
    db::DbPool,
    entities::{
        bid_items,
        bids::{self, BidStatus},
        rfqs::{self, RfqStatus},
        vendors::{self, VendorStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BidItemInput {
    #[validate(length(min = 1, max = 255))]
    pub medicine_name: String,
    #[validate(range(min = 1))]
    pub item_quantity: i32,
    pub item_price: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Wire shape for a bid with its line items and the bidding vendor's name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    pub bid_id: i32,
    pub rfq_id: i32,
    pub vendor_id: i32,
    pub vendor_name: String,
    pub status: BidStatus,
    pub items: Vec<BidItemView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidItemView {
    pub medicine_name: String,
    pub item_quantity: i32,
    pub item_price: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl BidItemView {
    fn from_model(item: bid_items::Model) -> Self {
        Self {
            medicine_name: item.medicine_name,
            item_quantity: item.item_quantity,
            item_price: item.item_price,
            delivery_date: item.delivery_date,
            expiry_date: item.expiry_date,
            notes: item.notes,
        }
    }
}

/// Service for vendor bids on open RFQs.
#[derive(Clone)]
pub struct BidService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BidService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Submits a bid on an RFQ. Only approved vendors may bid, and only on
    /// RFQs still open for submissions. A vendor may submit more than one
    /// bid on the same RFQ; later bids act as revisions for the manager to
    /// choose between.
    #[instrument(skip(self, items))]
    pub async fn create_bid(
        &self,
        vendor_id: i32,
        rfq_id: i32,
        items: Vec<BidItemInput>,
    ) -> Result<BidView, ServiceError> {
        validate_items(&items)?;

        let vendor = vendors::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;
        if vendor.status != VendorStatus::Approved {
            return Err(ServiceError::VendorNotEligible(
                "Vendor is not approved for bidding".to_string(),
            ));
        }

        let rfq = rfqs::Entity::find_by_id(rfq_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("RFQ {} not found", rfq_id)))?;
        if rfq.status != RfqStatus::Issued {
            return Err(ServiceError::Conflict(
                "RFQ is not open for bidding".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let bid = bids::ActiveModel {
            rfq_id: Set(rfq_id),
            vendor_id: Set(vendor_id),
            status: Set(BidStatus::Submitted),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let inserted = insert_items(&txn, bid.id, items).await?;
        txn.commit().await?;

        info!(bid_id = bid.id, rfq_id, vendor_id, "bid submitted");
        self.publish(Event::BidSubmitted {
            bid_id: bid.id,
            rfq_id,
            vendor_id,
        })
        .await;

        Ok(BidView {
            bid_id: bid.id,
            rfq_id,
            vendor_id,
            vendor_name: vendor.business_name,
            status: bid.status,
            items: inserted.into_iter().map(BidItemView::from_model).collect(),
        })
    }

    /// Lists the bids on one RFQ. When `scope_store_id` is given the RFQ
    /// must belong to that store, otherwise it reads as absent.
    #[instrument(skip(self))]
    pub async fn get_bids_for_rfq(
        &self,
        rfq_id: i32,
        scope_store_id: Option<i32>,
    ) -> Result<Vec<BidView>, ServiceError> {
        let rfq = rfqs::Entity::find_by_id(rfq_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("RFQ {} not found", rfq_id)))?;
        if let Some(store_id) = scope_store_id {
            if rfq.store_id != store_id {
                return Err(ServiceError::NotFound(format!("RFQ {} not found", rfq_id)));
            }
        }

        let rows = bids::Entity::find()
            .filter(bids::Column::RfqId.eq(rfq_id))
            .find_with_related(bid_items::Entity)
            .order_by_asc(bids::Column::Id)
            .all(&*self.db_pool)
            .await?;
        self.assemble_views(rows).await
    }

    /// The calling vendor's own bids across all RFQs.
    #[instrument(skip(self))]
    pub async fn list_vendor_bids(&self, vendor_id: i32) -> Result<Vec<BidView>, ServiceError> {
        let rows = bids::Entity::find()
            .filter(bids::Column::VendorId.eq(vendor_id))
            .find_with_related(bid_items::Entity)
            .order_by_asc(bids::Column::Id)
            .all(&*self.db_pool)
            .await?;
        self.assemble_views(rows).await
    }

    /// Replaces a bid's items wholesale and marks the bid UPDATED. Only the
    /// owning vendor may do this, and only while the bid is still live.
    #[instrument(skip(self, items))]
    pub async fn update_bid_items(
        &self,
        vendor_id: i32,
        bid_id: i32,
        items: Vec<BidItemInput>,
    ) -> Result<BidView, ServiceError> {
        validate_items(&items)?;

        let txn = self.db_pool.begin().await?;
        let bid = self.load_owned(&txn, vendor_id, bid_id).await?;
        if bid.status.is_terminal() {
            return Err(ServiceError::Conflict(
                "Bid has already been decided".to_string(),
            ));
        }
        let rfq_id = bid.rfq_id;

        let mut active: bids::ActiveModel = bid.into();
        active.status = Set(BidStatus::Updated);
        active.updated_at = Set(Utc::now());
        let bid = active.update(&txn).await?;

        bid_items::Entity::delete_many()
            .filter(bid_items::Column::BidId.eq(bid_id))
            .exec(&txn)
            .await?;
        let inserted = insert_items(&txn, bid_id, items).await?;
        txn.commit().await?;

        self.publish(Event::BidUpdated { bid_id }).await;

        let vendor = vendors::Entity::find_by_id(vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        Ok(BidView {
            bid_id,
            rfq_id,
            vendor_id,
            vendor_name: vendor.business_name,
            status: bid.status,
            items: inserted.into_iter().map(BidItemView::from_model).collect(),
        })
    }

    /// Withdraws (deletes) a bid and its items. Ownership and liveness rules
    /// match [`Self::update_bid_items`].
    #[instrument(skip(self))]
    pub async fn delete_bid(&self, vendor_id: i32, bid_id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let bid = self.load_owned(&txn, vendor_id, bid_id).await?;
        if bid.status.is_terminal() {
            return Err(ServiceError::Conflict(
                "Bid has already been decided".to_string(),
            ));
        }
        bids::Entity::delete_by_id(bid.id).exec(&txn).await?;
        txn.commit().await?;

        self.publish(Event::BidWithdrawn { bid_id }).await;
        Ok(())
    }

    /// The mutation is already committed when events go out; a delivery
    /// failure is logged rather than surfaced as an error.
    async fn publish(&self, event: Event) {
        if let Err(err) = self.event_sender.send(event).await {
            warn!(error = %err, "event delivery failed");
        }
    }

    async fn load_owned<C: ConnectionTrait>(
        &self,
        conn: &C,
        vendor_id: i32,
        bid_id: i32,
    ) -> Result<bids::Model, ServiceError> {
        let bid = bids::Entity::find_by_id(bid_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Bid {} not found", bid_id)))?;
        if bid.vendor_id != vendor_id {
            return Err(ServiceError::Forbidden(
                "Bid belongs to a different vendor".to_string(),
            ));
        }
        Ok(bid)
    }

    async fn assemble_views(
        &self,
        rows: Vec<(bids::Model, Vec<bid_items::Model>)>,
    ) -> Result<Vec<BidView>, ServiceError> {
        let vendor_ids: Vec<i32> = rows.iter().map(|(bid, _)| bid.vendor_id).collect();
        let vendor_names: HashMap<i32, String> = vendors::Entity::find()
            .filter(vendors::Column::Id.is_in(vendor_ids))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|vendor| (vendor.id, vendor.business_name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(bid, items)| BidView {
                bid_id: bid.id,
                rfq_id: bid.rfq_id,
                vendor_id: bid.vendor_id,
                vendor_name: vendor_names
                    .get(&bid.vendor_id)
                    .cloned()
                    .unwrap_or_default(),
                status: bid.status,
                items: items.into_iter().map(BidItemView::from_model).collect(),
            })
            .collect())
    }
}

fn validate_items(items: &[BidItemInput]) -> Result<(), ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::ValidationError(
            "A bid needs at least one item".to_string(),
        ));
    }
    for item in items {
        item.validate()?;
        if item.item_price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Item price must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    bid_id: i32,
    items: Vec<BidItemInput>,
) -> Result<Vec<bid_items::Model>, ServiceError> {
    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let model = bid_items::ActiveModel {
            bid_id: Set(bid_id),
            medicine_name: Set(item.medicine_name),
            item_quantity: Set(item.item_quantity),
            item_price: Set(item.item_price),
            delivery_date: Set(item.delivery_date),
            expiry_date: Set(item.expiry_date),
            notes: Set(item.notes),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}
