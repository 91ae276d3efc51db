pub mod batches;
pub mod bid_items;
pub mod bids;
pub mod inventories;
pub mod products;
pub mod rfq_items;
pub mod rfqs;
pub mod stock_request_items;
pub mod stock_requests;
pub mod stores;
pub mod users;
pub mod vendor_documents;
pub mod vendors;
