mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

fn batch_payload(vendor_id: i64) -> serde_json::Value {
    json!({
        "vendor_id": vendor_id,
        "batch_code": "BATCH-2026-001",
        "delivery_date": "2026-08-15",
        "products": [
            {
                "product_name": "Paracetamol 500mg",
                "category": "Analgesic",
                "quantity": 1500,
                "price": "2.50",
                "expiry_date": "2028-01-31"
            },
            {
                "product_name": "Amoxicillin 250mg",
                "category": "Antibiotic",
                "quantity": 600,
                "price": "5.75"
            }
        ]
    })
}

#[tokio::test]
async fn batch_intake_and_branch_view() {
    let app = TestApp::new().await;
    let (store_id, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;
    let (vendor_id, _) = app.seed_approved_vendor("MediSupply Co").await;

    let response = app
        .request(Method::POST, "/api/v1/inventory", None, Some(&manager_token))
        .await;
    let inventory = read_json(response, StatusCode::CREATED).await;
    assert_eq!(inventory["store_id"].as_i64(), Some(store_id as i64));

    // A store holds exactly one inventory.
    let response = app
        .request(Method::POST, "/api/v1/inventory", None, Some(&manager_token))
        .await;
    read_json(response, StatusCode::CONFLICT).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/batches",
            Some(batch_payload(vendor_id as i64)),
            Some(&pharmacist_token),
        )
        .await;
    let batch = read_json(response, StatusCode::CREATED).await;
    assert_eq!(batch["batchCode"], "BATCH-2026-001");
    assert_eq!(batch["products"].as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/v1/inventory", None, Some(&pharmacist_token))
        .await;
    let view = read_json(response, StatusCode::OK).await;
    assert_eq!(view["storeName"], "Central Pharmacy");
    assert_eq!(view["batches"].as_array().unwrap().len(), 1);

    // The supplying vendor sees the delivery in their history.
    let vendor_token = app
        .state
        .auth
        .issue_vendor_token(vendor_id)
        .expect("vendor token");
    let response = app
        .request(Method::GET, "/api/v1/vendors/batches", None, Some(&vendor_token))
        .await;
    let deliveries = read_json(response, StatusCode::OK).await;
    assert_eq!(deliveries.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dispense_decrements_and_never_goes_negative() {
    let app = TestApp::new().await;
    let (_, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;
    let (vendor_id, _) = app.seed_approved_vendor("MediSupply Co").await;

    let response = app
        .request(Method::POST, "/api/v1/inventory", None, Some(&manager_token))
        .await;
    read_json(response, StatusCode::CREATED).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/batches",
            Some(batch_payload(vendor_id as i64)),
            Some(&pharmacist_token),
        )
        .await;
    let batch = read_json(response, StatusCode::CREATED).await;
    let product_id = batch["products"][0]["id"].as_i64().expect("product id");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/products/{}/dispense", product_id),
            Some(json!({ "quantity": 1400 })),
            Some(&pharmacist_token),
        )
        .await;
    let product = read_json(response, StatusCode::OK).await;
    assert_eq!(product["quantity_total"], 100);

    // Over-dispensing fails whole and leaves the count untouched.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/products/{}/dispense", product_id),
            Some(json!({ "quantity": 101 })),
            Some(&pharmacist_token),
        )
        .await;
    let body = read_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert!(
        body["message"].as_str().unwrap().contains("only 100 on hand"),
        "body: {}",
        body
    );

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/products/{}/dispense", product_id),
            Some(json!({ "quantity": 100 })),
            Some(&pharmacist_token),
        )
        .await;
    let product = read_json(response, StatusCode::OK).await;
    assert_eq!(product["quantity_total"], 0);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/products/{}/dispense", product_id),
            Some(json!({ "quantity": 0 })),
            Some(&pharmacist_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn inventory_is_scoped_per_store() {
    let app = TestApp::new().await;
    let (_, manager_a, pharmacist_a) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, manager_b, pharmacist_b) = app.seed_store_with_staff("North Branch").await;
    let (vendor_id, _) = app.seed_approved_vendor("MediSupply Co").await;

    for manager in [&manager_a, &manager_b] {
        let response = app
            .request(Method::POST, "/api/v1/inventory", None, Some(manager))
            .await;
        read_json(response, StatusCode::CREATED).await;
    }

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/batches",
            Some(batch_payload(vendor_id as i64)),
            Some(&pharmacist_a),
        )
        .await;
    let batch = read_json(response, StatusCode::CREATED).await;
    let batch_id = batch["batchId"].as_i64().unwrap();
    let product_id = batch["products"][0]["id"].as_i64().unwrap();

    // The other store cannot see or touch this batch.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/inventory/batches/{}", batch_id),
            None,
            Some(&pharmacist_b),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/inventory/products/{}/dispense", product_id),
            Some(json!({ "quantity": 10 })),
            Some(&pharmacist_b),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/inventory/batches/{}", batch_id),
            None,
            Some(&manager_b),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    // The owning store still can.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/inventory/batches/{}", batch_id),
            None,
            Some(&manager_a),
        )
        .await;
    read_json(response, StatusCode::OK).await;
}

#[tokio::test]
async fn batch_intake_requires_an_inventory() {
    let app = TestApp::new().await;
    let (_, _, pharmacist_token) = app.seed_store_with_staff("Central Pharmacy").await;
    let (vendor_id, _) = app.seed_approved_vendor("MediSupply Co").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/batches",
            Some(batch_payload(vendor_id as i64)),
            Some(&pharmacist_token),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn batch_intake_rejects_empty_product_list() {
    let app = TestApp::new().await;
    let (_, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;
    let (vendor_id, _) = app.seed_approved_vendor("MediSupply Co").await;

    let response = app
        .request(Method::POST, "/api/v1/inventory", None, Some(&manager_token))
        .await;
    read_json(response, StatusCode::CREATED).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/inventory/batches",
            Some(json!({ "vendor_id": vendor_id, "products": [] })),
            Some(&pharmacist_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}
