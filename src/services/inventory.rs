use crate::{
    db::DbPool,
    entities::{batches, inventories, products, stores, vendors},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub price: Decimal,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReceiveBatchInput {
    pub vendor_id: i32,
    #[validate(length(max = 100))]
    pub batch_code: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub products: Vec<ProductInput>,
}

/// Wire shape for a batch and its products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    pub batch_id: i32,
    pub vendor_id: i32,
    pub batch_code: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub products: Vec<products::Model>,
}

/// Aggregate view of one store's inventory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInventoryView {
    pub store_id: i32,
    pub store_name: String,
    pub inventory_id: i32,
    pub batches: Vec<BatchView>,
}

/// Service for per-store inventories: batch intake from vendors and product
/// dispensing.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates the store's inventory. Each store has exactly one.
    #[instrument(skip(self))]
    pub async fn create_inventory(&self, store_id: i32) -> Result<inventories::Model, ServiceError> {
        stores::Entity::find_by_id(store_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;

        let existing = inventories::Entity::find()
            .filter(inventories::Column::StoreId.eq(store_id))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Store already has an inventory".to_string(),
            ));
        }

        let now = Utc::now();
        let inventory = inventories::ActiveModel {
            store_id: Set(store_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        self.publish(Event::InventoryCreated {
            inventory_id: inventory.id,
            store_id,
        })
        .await;

        Ok(inventory)
    }

    /// Records a delivered batch and its products into the store's inventory
    /// in one transaction.
    #[instrument(skip(self, input))]
    pub async fn create_batch_with_products(
        &self,
        store_id: i32,
        input: ReceiveBatchInput,
    ) -> Result<BatchView, ServiceError> {
        input.validate()?;
        if input.products.is_empty() {
            return Err(ServiceError::ValidationError(
                "A batch needs at least one product".to_string(),
            ));
        }
        for product in &input.products {
            product.validate()?;
            if product.price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Product price must be positive".to_string(),
                ));
            }
        }

        vendors::Entity::find_by_id(input.vendor_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vendor {} not found", input.vendor_id))
            })?;
        let inventory = self.inventory_for_store(&*self.db_pool, store_id).await?;

        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let batch = batches::ActiveModel {
            inventory_id: Set(inventory.id),
            vendor_id: Set(input.vendor_id),
            batch_code: Set(input.batch_code),
            delivery_date: Set(input.delivery_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut created = Vec::with_capacity(input.products.len());
        for product in input.products {
            let model = products::ActiveModel {
                batch_id: Set(batch.id),
                product_name: Set(product.product_name),
                category: Set(product.category),
                quantity_total: Set(product.quantity),
                price: Set(product.price),
                expiry_date: Set(product.expiry_date),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(model);
        }

        txn.commit().await?;

        info!(batch_id = batch.id, store_id, vendor_id = batch.vendor_id, "batch received");
        self.publish(Event::BatchReceived {
            batch_id: batch.id,
            vendor_id: batch.vendor_id,
        })
        .await;

        Ok(BatchView {
            batch_id: batch.id,
            vendor_id: batch.vendor_id,
            batch_code: batch.batch_code,
            delivery_date: batch.delivery_date,
            products: created,
        })
    }

    /// Dispenses a quantity of a product from the store's stock. The on-hand
    /// count never goes below zero; an over-dispense fails whole.
    #[instrument(skip(self))]
    pub async fn dispense_product(
        &self,
        store_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<products::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Dispense quantity must be positive".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await?;
        let product = self.load_scoped_product(&txn, store_id, product_id).await?;
        if product.quantity_total < quantity {
            warn!(
                product_id,
                requested = quantity,
                on_hand = product.quantity_total,
                "dispense refused"
            );
            return Err(ServiceError::InsufficientStock(format!(
                "Requested {} but only {} on hand",
                quantity, product.quantity_total
            )));
        }

        let remaining = product.quantity_total - quantity;
        let mut active: products::ActiveModel = product.into();
        active.quantity_total = Set(remaining);
        active.updated_at = Set(Utc::now());
        let product = active.update(&txn).await?;
        txn.commit().await?;

        self.publish(Event::ProductDispensed {
            product_id,
            quantity,
            remaining,
        })
        .await;

        Ok(product)
    }

    /// Full inventory view for one store: every batch with its products.
    #[instrument(skip(self))]
    pub async fn get_branch_inventory_details(
        &self,
        store_id: i32,
    ) -> Result<BranchInventoryView, ServiceError> {
        let store = stores::Entity::find_by_id(store_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;
        let inventory = self.inventory_for_store(&*self.db_pool, store_id).await?;

        let rows = batches::Entity::find()
            .filter(batches::Column::InventoryId.eq(inventory.id))
            .find_with_related(products::Entity)
            .order_by_asc(batches::Column::Id)
            .all(&*self.db_pool)
            .await?;

        Ok(BranchInventoryView {
            store_id,
            store_name: store.store_name,
            inventory_id: inventory.id,
            batches: rows.into_iter().map(assemble_batch).collect(),
        })
    }

    /// One batch with its products, scoped to the store.
    #[instrument(skip(self))]
    pub async fn get_batch(&self, store_id: i32, batch_id: i32) -> Result<BatchView, ServiceError> {
        let batch = self.load_scoped_batch(&*self.db_pool, store_id, batch_id).await?;
        let items = products::Entity::find()
            .filter(products::Column::BatchId.eq(batch.id))
            .order_by_asc(products::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(assemble_batch((batch, items)))
    }

    /// Every batch a vendor has delivered, across stores. Vendor-facing view
    /// of their fulfilment history.
    #[instrument(skip(self))]
    pub async fn batches_by_vendor(&self, vendor_id: i32) -> Result<Vec<BatchView>, ServiceError> {
        let rows = batches::Entity::find()
            .filter(batches::Column::VendorId.eq(vendor_id))
            .find_with_related(products::Entity)
            .order_by_asc(batches::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows.into_iter().map(assemble_batch).collect())
    }

    /// Removes a batch and, through cascade, its products.
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, store_id: i32, batch_id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let batch = self.load_scoped_batch(&txn, store_id, batch_id).await?;
        batches::Entity::delete_by_id(batch.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn inventory_for_store<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: i32,
    ) -> Result<inventories::Model, ServiceError> {
        inventories::Entity::find()
            .filter(inventories::Column::StoreId.eq(store_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Store {} has no inventory", store_id))
            })
    }

    async fn load_scoped_batch<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: i32,
        batch_id: i32,
    ) -> Result<batches::Model, ServiceError> {
        let inventory = self.inventory_for_store(conn, store_id).await?;
        let batch = batches::Entity::find_by_id(batch_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", batch_id)))?;
        if batch.inventory_id != inventory.id {
            return Err(ServiceError::NotFound(format!(
                "Batch {} not found",
                batch_id
            )));
        }
        Ok(batch)
    }

    // Takes a row lock on the product so concurrent dispenses serialize and
    // the on-hand check holds when the decrement commits. SQLite ignores the
    // lock clause; its single writer gives the same ordering.
    async fn load_scoped_product<C: ConnectionTrait>(
        &self,
        conn: &C,
        store_id: i32,
        product_id: i32,
    ) -> Result<products::Model, ServiceError> {
        let product = products::Entity::find_by_id(product_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", product_id))
            })?;
        self.load_scoped_batch(conn, store_id, product.batch_id)
            .await?;
        Ok(product)
    }

    /// The mutation is already committed when events go out; a delivery
    /// failure is logged rather than surfaced as an error.
    async fn publish(&self, event: Event) {
        if let Err(err) = self.event_sender.send(event).await {
            warn!(error = %err, "event delivery failed");
        }
    }
}

fn assemble_batch((batch, items): (batches::Model, Vec<products::Model>)) -> BatchView {
    BatchView {
        batch_id: batch.id,
        vendor_id: batch.vendor_id,
        batch_code: batch.batch_code,
        delivery_date: batch.delivery_date,
        products: items,
    }
}
