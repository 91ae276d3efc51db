mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

async fn seed_rfq(app: &TestApp, manager_token: &str) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/rfqs",
            Some(json!({
                "items": [{ "medicine_name": "Cetirizine 10mg", "quantity_needed": 300 }]
            })),
            Some(manager_token),
        )
        .await;
    let rfq = read_json(response, StatusCode::CREATED).await;
    rfq["rfq"]["rfqId"].as_i64().expect("rfq id")
}

async fn submit_bid(app: &TestApp, vendor_token: &str, rfq_id: i64) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/bids",
            Some(json!({
                "rfqId": rfq_id,
                "items": [{
                    "medicine_name": "Cetirizine 10mg",
                    "item_quantity": 300,
                    "item_price": "1.20"
                }]
            })),
            Some(vendor_token),
        )
        .await;
    let bid = read_json(response, StatusCode::CREATED).await;
    bid["bidId"].as_i64().expect("bid id")
}

#[tokio::test]
async fn only_the_owning_vendor_can_touch_a_bid() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, vendor_a_token) = app.seed_approved_vendor("MediSupply Co").await;
    let (_, vendor_b_token) = app.seed_approved_vendor("PharmaDirect Ltd").await;

    let rfq_id = seed_rfq(&app, &manager_token).await;
    let bid_id = submit_bid(&app, &vendor_a_token, rfq_id).await;

    let replacement = json!({
        "items": [{
            "medicine_name": "Cetirizine 10mg",
            "item_quantity": 300,
            "item_price": "0.95"
        }]
    });

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/bids/{}/items", bid_id),
            Some(replacement.clone()),
            Some(&vendor_b_token),
        )
        .await;
    read_json(response, StatusCode::FORBIDDEN).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/bids/{}", bid_id),
            None,
            Some(&vendor_b_token),
        )
        .await;
    read_json(response, StatusCode::FORBIDDEN).await;

    // The owner's update goes through and replaces the items wholesale.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/bids/{}/items", bid_id),
            Some(replacement),
            Some(&vendor_a_token),
        )
        .await;
    let updated = read_json(response, StatusCode::OK).await;
    assert_eq!(updated["status"], "UPDATED");
    let items = updated["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["itemPrice"], "0.95");
}

#[tokio::test]
async fn decided_bids_refuse_mutation() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, vendor_a_token) = app.seed_approved_vendor("MediSupply Co").await;
    let (_, vendor_b_token) = app.seed_approved_vendor("PharmaDirect Ltd").await;

    let rfq_id = seed_rfq(&app, &manager_token).await;
    let winning_bid = submit_bid(&app, &vendor_a_token, rfq_id).await;
    let losing_bid = submit_bid(&app, &vendor_b_token, rfq_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rfqs/{}/award", rfq_id),
            Some(json!({ "winningBidId": winning_bid })),
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::OK).await;

    let replacement = json!({
        "items": [{
            "medicine_name": "Cetirizine 10mg",
            "item_quantity": 300,
            "item_price": "0.50"
        }]
    });

    // Accepted and rejected bids alike are frozen.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/bids/{}/items", winning_bid),
            Some(replacement.clone()),
            Some(&vendor_a_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/bids/{}/items", losing_bid),
            Some(replacement),
            Some(&vendor_b_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/bids/{}", losing_bid),
            None,
            Some(&vendor_b_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn vendor_withdraws_a_live_bid() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, vendor_token) = app.seed_approved_vendor("MediSupply Co").await;

    let rfq_id = seed_rfq(&app, &manager_token).await;
    let bid_id = submit_bid(&app, &vendor_token, rfq_id).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/bids/{}", bid_id),
            None,
            Some(&vendor_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, "/api/v1/bids/mine", None, Some(&vendor_token))
        .await;
    let mine = read_json(response, StatusCode::OK).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn vendor_can_submit_a_revised_bid() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, vendor_token) = app.seed_approved_vendor("MediSupply Co").await;

    let rfq_id = seed_rfq(&app, &manager_token).await;
    let first = submit_bid(&app, &vendor_token, rfq_id).await;
    let second = submit_bid(&app, &vendor_token, rfq_id).await;
    assert_ne!(first, second);

    let response = app
        .request(Method::GET, "/api/v1/bids/mine", None, Some(&vendor_token))
        .await;
    let mine = read_json(response, StatusCode::OK).await;
    assert_eq!(mine.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bidding_closes_once_the_rfq_is_awarded() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, vendor_a_token) = app.seed_approved_vendor("MediSupply Co").await;
    let (_, vendor_b_token) = app.seed_approved_vendor("PharmaDirect Ltd").await;

    let rfq_id = seed_rfq(&app, &manager_token).await;
    let bid_id = submit_bid(&app, &vendor_a_token, rfq_id).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/rfqs/{}/award", rfq_id),
            Some(json!({ "winningBidId": bid_id })),
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/bids",
            Some(json!({
                "rfqId": rfq_id,
                "items": [{
                    "medicine_name": "Cetirizine 10mg",
                    "item_quantity": 300,
                    "item_price": "1.00"
                }]
            })),
            Some(&vendor_b_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;
}
