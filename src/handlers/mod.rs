pub mod auth;
pub mod bids;
pub mod common;
pub mod inventory;
pub mod rfqs;
pub mod stock_requests;
pub mod stores;
pub mod vendors;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub vendors: Arc<crate::services::VendorService>,
    pub rfqs: Arc<crate::services::RfqService>,
    pub bids: Arc<crate::services::BidService>,
    pub inventory: Arc<crate::services::InventoryService>,
    pub stock_requests: Arc<crate::services::StockRequestService>,
    pub stores: Arc<crate::services::StoreService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<crate::auth::AuthService>,
    ) -> Self {
        Self {
            vendors: Arc::new(crate::services::VendorService::new(
                db_pool.clone(),
                event_sender.clone(),
                auth_service.clone(),
            )),
            rfqs: Arc::new(crate::services::RfqService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            bids: Arc::new(crate::services::BidService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            inventory: Arc::new(crate::services::InventoryService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            stock_requests: Arc::new(crate::services::StockRequestService::new(
                db_pool.clone(),
                event_sender,
            )),
            stores: Arc::new(crate::services::StoreService::new(db_pool, auth_service)),
        }
    }
}
