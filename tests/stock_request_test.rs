mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

async fn raise_request(app: &TestApp, pharmacist_token: &str) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-requests",
            Some(json!({
                "items": [
                    { "medicine_name": "Insulin Glargine", "required_quantity": 40 },
                    { "medicine_name": "Metformin 500mg", "required_quantity": 200 }
                ],
                "remarks": "Running low before the weekend"
            })),
            Some(pharmacist_token),
        )
        .await;
    let request = read_json(response, StatusCode::CREATED).await;
    assert_eq!(request["status"], "PENDING");
    request["requestId"].as_i64().expect("request id")
}

#[tokio::test]
async fn request_moves_through_approval_to_fulfilment() {
    let app = TestApp::new().await;
    let (_, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;

    let request_id = raise_request(&app, &pharmacist_token).await;

    // Fulfilment requires a prior approval.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/fulfill", request_id),
            None,
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/approve", request_id),
            None,
            Some(&manager_token),
        )
        .await;
    let approved = read_json(response, StatusCode::OK).await;
    assert_eq!(approved["status"], "APPROVED");
    assert!(approved["approvedBy"].as_i64().is_some());

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/fulfill", request_id),
            None,
            Some(&manager_token),
        )
        .await;
    let fulfilled = read_json(response, StatusCode::OK).await;
    assert_eq!(fulfilled["status"], "FULFILLED");
}

#[tokio::test]
async fn decided_requests_cannot_be_decided_again() {
    let app = TestApp::new().await;
    let (_, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;

    let request_id = raise_request(&app, &pharmacist_token).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/reject", request_id),
            Some(json!({ "remarks": "Stock counts disagree, recount first" })),
            Some(&manager_token),
        )
        .await;
    let rejected = read_json(response, StatusCode::OK).await;
    assert_eq!(rejected["status"], "REJECTED");
    assert_eq!(rejected["remarks"], "Stock counts disagree, recount first");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/approve", request_id),
            None,
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn listing_filters_by_status() {
    let app = TestApp::new().await;
    let (_, manager_token, pharmacist_token) =
        app.seed_store_with_staff("Central Pharmacy").await;

    let first = raise_request(&app, &pharmacist_token).await;
    raise_request(&app, &pharmacist_token).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/approve", first),
            None,
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/stock-requests?status=PENDING",
            None,
            Some(&manager_token),
        )
        .await;
    let pending = read_json(response, StatusCode::OK).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let response = app
        .request(
            Method::GET,
            "/api/v1/stock-requests",
            None,
            Some(&pharmacist_token),
        )
        .await;
    let all = read_json(response, StatusCode::OK).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn requests_are_scoped_to_their_store() {
    let app = TestApp::new().await;
    let (_, _, pharmacist_a) = app.seed_store_with_staff("Central Pharmacy").await;
    let (_, manager_b, pharmacist_b) = app.seed_store_with_staff("North Branch").await;

    let request_id = raise_request(&app, &pharmacist_a).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/stock-requests/{}/approve", request_id),
            None,
            Some(&manager_b),
        )
        .await;
    read_json(response, StatusCode::NOT_FOUND).await;

    let response = app
        .request(Method::GET, "/api/v1/stock-requests", None, Some(&pharmacist_b))
        .await;
    let other_store = read_json(response, StatusCode::OK).await;
    assert!(other_store.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_item_list_is_rejected() {
    let app = TestApp::new().await;
    let (_, _, pharmacist_token) = app.seed_store_with_staff("Central Pharmacy").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-requests",
            Some(json!({ "items": [] })),
            Some(&pharmacist_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn managers_cannot_raise_requests() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-requests",
            Some(json!({
                "items": [{ "medicine_name": "Metformin 500mg", "required_quantity": 50 }]
            })),
            Some(&manager_token),
        )
        .await;
    read_json(response, StatusCode::UNAUTHORIZED).await;
}
