use crate::{
    db::DbPool,
    entities::{
        bids::{self, BidStatus},
        rfq_items,
        rfqs::{self, RfqStatus},
        stores, users, vendors,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RfqItemInput {
    #[validate(length(min = 1, max = 255))]
    pub medicine_name: String,
    #[validate(range(min = 1))]
    pub quantity_needed: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRfqInput {
    #[validate]
    pub items: Vec<RfqItemInput>,
    pub status: Option<RfqStatus>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub special_instructions: Option<String>,
}

/// Wire shape for a single RFQ. Field names are part of the client contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqSummary {
    pub rfq_id: i32,
    pub created_by: i32,
    pub status_award: RfqStatus,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqItemView {
    pub rfq_item_id: i32,
    pub rfq_item_name: String,
    pub quantity_needed: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RfqDetail {
    pub rfq: RfqSummary,
    pub items: Vec<RfqItemView>,
}

impl RfqDetail {
    fn assemble(rfq: rfqs::Model, items: Vec<rfq_items::Model>) -> Self {
        Self {
            rfq: RfqSummary {
                rfq_id: rfq.id,
                created_by: rfq.created_by,
                status_award: rfq.status,
                submission_deadline: rfq.submission_deadline,
                expected_delivery_date: rfq.expected_delivery_date,
            },
            items: items
                .into_iter()
                .map(|item| RfqItemView {
                    rfq_item_id: item.id,
                    rfq_item_name: item.medicine_name,
                    quantity_needed: item.quantity_needed,
                })
                .collect(),
        }
    }
}

/// Service for the RFQ lifecycle: creation, item management and the award
/// decision that closes the bidding round.
#[derive(Clone)]
pub struct RfqService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RfqService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an RFQ with its items for the manager's store.
    #[instrument(skip(self, input))]
    pub async fn create_rfq(
        &self,
        store_id: i32,
        created_by: i32,
        input: CreateRfqInput,
    ) -> Result<RfqDetail, ServiceError> {
        input.validate()?;
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "An RFQ needs at least one item".to_string(),
            ));
        }

        users::Entity::find_by_id(created_by)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", created_by)))?;
        stores::Entity::find_by_id(store_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;

        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let rfq = rfqs::ActiveModel {
            store_id: Set(store_id),
            created_by: Set(created_by),
            status: Set(input.status.unwrap_or(RfqStatus::Issued)),
            submission_deadline: Set(input.submission_deadline),
            expected_delivery_date: Set(input.expected_delivery_date),
            special_instructions: Set(input.special_instructions),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let inserted = rfq_items::ActiveModel {
                rfq_id: Set(rfq.id),
                medicine_name: Set(item.medicine_name),
                quantity_needed: Set(item.quantity_needed),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(inserted);
        }

        txn.commit().await?;

        info!(rfq_id = rfq.id, store_id, "RFQ created");
        self.publish(Event::RfqCreated {
            rfq_id: rfq.id,
            store_id,
        })
        .await;

        Ok(RfqDetail::assemble(rfq, items))
    }

    /// Lists every RFQ with its items. Used by admins and by vendors browsing
    /// open solicitations.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<RfqDetail>, ServiceError> {
        let rows = rfqs::Entity::find()
            .find_with_related(rfq_items::Entity)
            .order_by_asc(rfqs::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(rfq, items)| RfqDetail::assemble(rfq, items))
            .collect())
    }

    /// Lists the RFQs issued by one store.
    #[instrument(skip(self))]
    pub async fn list_for_store(&self, store_id: i32) -> Result<Vec<RfqDetail>, ServiceError> {
        let rows = rfqs::Entity::find()
            .filter(rfqs::Column::StoreId.eq(store_id))
            .find_with_related(rfq_items::Entity)
            .order_by_asc(rfqs::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(rfq, items)| RfqDetail::assemble(rfq, items))
            .collect())
    }

    /// Fetches one RFQ. When `scope_store_id` is given, an RFQ belonging to a
    /// different store reads as absent rather than forbidden.
    #[instrument(skip(self))]
    pub async fn get_rfq(
        &self,
        rfq_id: i32,
        scope_store_id: Option<i32>,
    ) -> Result<RfqDetail, ServiceError> {
        let rfq = self.load_scoped(&*self.db_pool, rfq_id, scope_store_id).await?;
        let items = rfq_items::Entity::find()
            .filter(rfq_items::Column::RfqId.eq(rfq.id))
            .order_by_asc(rfq_items::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(RfqDetail::assemble(rfq, items))
    }

    /// Updates an RFQ's fields and replaces its item collection wholesale.
    #[instrument(skip(self, input))]
    pub async fn update_rfq(
        &self,
        store_id: i32,
        rfq_id: i32,
        input: CreateRfqInput,
    ) -> Result<RfqDetail, ServiceError> {
        input.validate()?;
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "An RFQ needs at least one item".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await?;
        let rfq = self.lock_scoped(&txn, rfq_id, store_id).await?;
        if rfq.status == RfqStatus::Awarded {
            return Err(ServiceError::Conflict(
                "RFQ has already been awarded".to_string(),
            ));
        }

        let mut active: rfqs::ActiveModel = rfq.into();
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.submission_deadline = Set(input.submission_deadline);
        active.expected_delivery_date = Set(input.expected_delivery_date);
        active.special_instructions = Set(input.special_instructions);
        active.updated_at = Set(Utc::now());
        let rfq = active.update(&txn).await?;

        // Wholesale replacement: the client sends the complete item list.
        rfq_items::Entity::delete_many()
            .filter(rfq_items::Column::RfqId.eq(rfq_id))
            .exec(&txn)
            .await?;
        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let inserted = rfq_items::ActiveModel {
                rfq_id: Set(rfq_id),
                medicine_name: Set(item.medicine_name),
                quantity_needed: Set(item.quantity_needed),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(inserted);
        }

        txn.commit().await?;

        self.publish(Event::RfqUpdated { rfq_id }).await;

        Ok(RfqDetail::assemble(rfq, items))
    }

    /// Deletes an RFQ and, through cascade, its items and bids.
    #[instrument(skip(self))]
    pub async fn delete_rfq(&self, store_id: i32, rfq_id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let rfq = self.lock_scoped(&txn, rfq_id, store_id).await?;
        if rfq.status == RfqStatus::Awarded {
            return Err(ServiceError::Conflict(
                "Awarded RFQs cannot be deleted".to_string(),
            ));
        }
        rfqs::Entity::delete_by_id(rfq.id).exec(&txn).await?;
        txn.commit().await?;

        self.publish(Event::RfqDeleted { rfq_id }).await;
        Ok(())
    }

    /// Awards the RFQ to one bid. The winner becomes ACCEPTED, every other
    /// bid on the RFQ becomes REJECTED, and the RFQ records the winning
    /// vendor and bid. All writes share one transaction and the RFQ row is
    /// locked for its duration, so of two concurrent awards exactly one
    /// commits and the other sees AWARDED and fails with Conflict.
    #[instrument(skip(self))]
    pub async fn award(
        &self,
        store_id: i32,
        rfq_id: i32,
        winning_bid_id: i32,
    ) -> Result<RfqDetail, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let rfq = self.lock_scoped(&txn, rfq_id, store_id).await?;
        if rfq.status == RfqStatus::Awarded {
            return Err(ServiceError::Conflict(
                "RFQ has already been awarded".to_string(),
            ));
        }

        let all_bids = bids::Entity::find()
            .filter(bids::Column::RfqId.eq(rfq_id))
            .all(&txn)
            .await?;
        let winner = all_bids
            .iter()
            .find(|bid| bid.id == winning_bid_id)
            .cloned()
            .ok_or_else(|| {
                ServiceError::InvalidBid(format!(
                    "Bid {} does not belong to RFQ {}",
                    winning_bid_id, rfq_id
                ))
            })?;
        let awarded_vendor_id = winner.vendor_id;

        for bid in all_bids {
            let accepted = bid.id == winning_bid_id;
            let mut active: bids::ActiveModel = bid.into();
            active.status = Set(if accepted {
                BidStatus::Accepted
            } else {
                BidStatus::Rejected
            });
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
        }

        let mut active: rfqs::ActiveModel = rfq.into();
        active.status = Set(RfqStatus::Awarded);
        active.awarded_vendor_id = Set(Some(awarded_vendor_id));
        active.awarded_bid_id = Set(Some(winning_bid_id));
        active.updated_at = Set(Utc::now());
        let rfq = active.update(&txn).await?;

        txn.commit().await?;

        info!(rfq_id, winning_bid_id, awarded_vendor_id, "RFQ awarded");
        self.publish(Event::RfqAwarded {
            rfq_id,
            winning_bid_id,
            awarded_vendor_id,
        })
        .await;

        let items = rfq_items::Entity::find()
            .filter(rfq_items::Column::RfqId.eq(rfq_id))
            .order_by_asc(rfq_items::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(RfqDetail::assemble(rfq, items))
    }

    /// Vendors that have won at least one of the store's RFQs. Batch intake
    /// offers these as the supplying vendor choices.
    #[instrument(skip(self))]
    pub async fn awarded_vendors(&self, store_id: i32) -> Result<Vec<vendors::Model>, ServiceError> {
        let awarded = rfqs::Entity::find()
            .filter(rfqs::Column::StoreId.eq(store_id))
            .filter(rfqs::Column::Status.eq(RfqStatus::Awarded))
            .all(&*self.db_pool)
            .await?;
        let mut vendor_ids: Vec<i32> = awarded
            .into_iter()
            .filter_map(|rfq| rfq.awarded_vendor_id)
            .collect();
        vendor_ids.sort_unstable();
        vendor_ids.dedup();
        if vendor_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vendors::Entity::find()
            .filter(vendors::Column::Id.is_in(vendor_ids))
            .order_by_asc(vendors::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    async fn load_scoped<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        rfq_id: i32,
        scope_store_id: Option<i32>,
    ) -> Result<rfqs::Model, ServiceError> {
        let rfq = rfqs::Entity::find_by_id(rfq_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("RFQ {} not found", rfq_id)))?;
        if let Some(store_id) = scope_store_id {
            if rfq.store_id != store_id {
                // Cross-store access reads as absence, not as Forbidden.
                return Err(ServiceError::NotFound(format!("RFQ {} not found", rfq_id)));
            }
        }
        Ok(rfq)
    }

    /// Store-scoped load that takes a `SELECT ... FOR UPDATE` row lock, so
    /// check-then-write sequences on the same RFQ serialize instead of both
    /// passing their status guard under read-committed isolation. SQLite has
    /// no row locks and serializes writers globally; the clause is dropped
    /// there.
    async fn lock_scoped<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        rfq_id: i32,
        store_id: i32,
    ) -> Result<rfqs::Model, ServiceError> {
        let rfq = rfqs::Entity::find_by_id(rfq_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("RFQ {} not found", rfq_id)))?;
        if rfq.store_id != store_id {
            return Err(ServiceError::NotFound(format!("RFQ {} not found", rfq_id)));
        }
        Ok(rfq)
    }

    /// The mutation is already committed when events go out; a delivery
    /// failure is logged rather than surfaced as an error.
    async fn publish(&self, event: Event) {
        if let Err(err) = self.event_sender.send(event).await {
            warn!(error = %err, "event delivery failed");
        }
    }
}
