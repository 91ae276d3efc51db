//! Domain events published by the service layer.
//!
//! Delivery is fire-and-forget: events land on an mpsc channel consumed by a
//! background task that records them. No external notification transport.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted as workflow state changes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Vendor onboarding
    VendorRegistered { vendor_id: i32 },
    VendorDocumentUploaded { vendor_id: i32, doc_id: i32 },
    VendorDocumentVerified { doc_id: i32, verified_by: i32 },
    VendorDocumentRejected { doc_id: i32, verified_by: i32 },
    VendorApproved { vendor_id: i32 },
    VendorRejected { vendor_id: i32 },

    // RFQ / bidding
    RfqCreated { rfq_id: i32, store_id: i32 },
    RfqUpdated { rfq_id: i32 },
    RfqDeleted { rfq_id: i32 },
    RfqAwarded {
        rfq_id: i32,
        winning_bid_id: i32,
        awarded_vendor_id: i32,
    },
    BidSubmitted { bid_id: i32, rfq_id: i32, vendor_id: i32 },
    BidUpdated { bid_id: i32 },
    BidWithdrawn { bid_id: i32 },

    // Inventory
    InventoryCreated { inventory_id: i32, store_id: i32 },
    BatchReceived { batch_id: i32, vendor_id: i32 },
    ProductDispensed {
        product_id: i32,
        quantity: i32,
        remaining: i32,
    },

    // Stock requests
    StockRequestCreated { request_id: i32, store_id: i32 },
    StockRequestApproved { request_id: i32, approved_by: i32 },
    StockRequestRejected { request_id: i32, approved_by: i32 },
    StockRequestFulfilled { request_id: i32 },
}

/// Cloneable handle for publishing [`Event`]s.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Background consumer that records events as structured log lines.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %payload, "domain event"),
            Err(err) => warn!(error = %err, "failed to serialize domain event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::RfqAwarded {
                rfq_id: 1,
                winning_bid_id: 2,
                awarded_vendor_id: 3,
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::RfqAwarded {
                rfq_id,
                winning_bid_id,
                awarded_vendor_id,
            } => {
                assert_eq!((rfq_id, winning_bid_id, awarded_vendor_id), (1, 2, 3));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
