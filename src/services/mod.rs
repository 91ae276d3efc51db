pub mod bids;
pub mod inventory;
pub mod rfqs;
pub mod stock_requests;
pub mod stores;
pub mod vendors;

pub use bids::BidService;
pub use inventory::InventoryService;
pub use rfqs::RfqService;
pub use stock_requests::StockRequestService;
pub use stores::StoreService;
pub use vendors::VendorService;
