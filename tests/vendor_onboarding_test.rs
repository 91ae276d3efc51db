mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

fn registration(suffix: &str) -> serde_json::Value {
    json!({
        "business_name": "MediSupply Co",
        "email": format!("contact{}@medisupply.test", suffix),
        "password": "a-long-enough-password",
        "gst_number": format!("GST-{}", suffix),
        "license_number": format!("LIC-{}", suffix),
        "address": "12 Supply Road"
    })
}

#[tokio::test]
async fn approval_is_gated_on_verified_documents() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.seed_admin().await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("a1")), None)
        .await;
    let vendor = read_json(response, StatusCode::CREATED).await;
    let vendor_id = vendor["id"].as_i64().expect("vendor id");
    assert_eq!(vendor["status"], "PENDING");
    assert!(vendor.get("password_hash").is_none());

    // No documents on file yet.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/approve", vendor_id),
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;

    let vendor_token = app
        .state
        .auth
        .issue_vendor_token(vendor_id as i32)
        .expect("vendor token");
    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors/documents",
            Some(json!({
                "doc_type": "DRUG_LICENSE",
                "file_url": "https://files.test/license.pdf"
            })),
            Some(&vendor_token),
        )
        .await;
    let document = read_json(response, StatusCode::CREATED).await;
    let doc_id = document["id"].as_i64().expect("doc id");
    assert_eq!(document["status"], "PENDING");

    // A pending document still blocks approval.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/approve", vendor_id),
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/documents/{}/verify", doc_id),
            Some(json!({ "remarks": "License checks out" })),
            Some(&admin_token),
        )
        .await;
    let verified = read_json(response, StatusCode::OK).await;
    assert_eq!(verified["status"], "VERIFIED");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/approve", vendor_id),
            None,
            Some(&admin_token),
        )
        .await;
    let approved = read_json(response, StatusCode::OK).await;
    assert_eq!(approved["status"], "APPROVED");

    // Rejecting afterwards needs remarks.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/reject", vendor_id),
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/reject", vendor_id),
            Some(json!({ "remarks": "License revoked by the board" })),
            Some(&admin_token),
        )
        .await;
    let rejected = read_json(response, StatusCode::OK).await;
    assert_eq!(rejected["status"], "REJECTED");
}

#[tokio::test]
async fn rejected_document_blocks_approval() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.seed_admin().await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("r1")), None)
        .await;
    let vendor = read_json(response, StatusCode::CREATED).await;
    let vendor_id = vendor["id"].as_i64().unwrap();

    let vendor_token = app
        .state
        .auth
        .issue_vendor_token(vendor_id as i32)
        .expect("vendor token");
    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors/documents",
            Some(json!({
                "doc_type": "GST_CERTIFICATE",
                "file_url": "https://files.test/gst.pdf"
            })),
            Some(&vendor_token),
        )
        .await;
    let document = read_json(response, StatusCode::CREATED).await;
    let doc_id = document["id"].as_i64().unwrap();

    // Document rejection without remarks is refused.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/documents/{}/reject", doc_id),
            Some(json!({ "remarks": "  " })),
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/documents/{}/reject", doc_id),
            Some(json!({ "remarks": "Illegible scan" })),
            Some(&admin_token),
        )
        .await;
    let rejected = read_json(response, StatusCode::OK).await;
    assert_eq!(rejected["status"], "REJECTED");
    assert_eq!(rejected["remarks"], "Illegible scan");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/vendors/{}/approve", vendor_id),
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
}

#[tokio::test]
async fn blank_document_fields_are_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("w1")), None)
        .await;
    let vendor = read_json(response, StatusCode::CREATED).await;
    let vendor_token = app
        .state
        .auth
        .issue_vendor_token(vendor["id"].as_i64().unwrap() as i32)
        .expect("vendor token");

    // Whitespace-only fields are blank after trimming.
    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors/documents",
            Some(json!({ "doc_type": "  ", "file_url": "https://files.test/license.pdf" })),
            Some(&vendor_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors/documents",
            Some(json!({ "doc_type": "DRUG_LICENSE", "file_url": " " })),
            Some(&vendor_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Surrounding whitespace is stripped from stored values.
    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors/documents",
            Some(json!({
                "doc_type": " DRUG_LICENSE ",
                "file_url": " https://files.test/license.pdf "
            })),
            Some(&vendor_token),
        )
        .await;
    let document = read_json(response, StatusCode::CREATED).await;
    assert_eq!(document["doc_type"], "DRUG_LICENSE");
    assert_eq!(document["file_url"], "https://files.test/license.pdf");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("d1")), None)
        .await;
    read_json(response, StatusCode::CREATED).await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("d1")), None)
        .await;
    let body = read_json(response, StatusCode::CONFLICT).await;
    assert!(
        body["message"].as_str().unwrap().contains("already exists"),
        "body: {}",
        body
    );
}

#[tokio::test]
async fn unapproved_vendor_cannot_bid() {
    let app = TestApp::new().await;
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/rfqs",
            Some(json!({
                "items": [{ "medicine_name": "Paracetamol 500mg", "quantity_needed": 100 }]
            })),
            Some(&manager_token),
        )
        .await;
    let rfq = read_json(response, StatusCode::CREATED).await;
    let rfq_id = rfq["rfq"]["rfqId"].as_i64().unwrap();

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("b1")), None)
        .await;
    let vendor = read_json(response, StatusCode::CREATED).await;
    let vendor_token = app
        .state
        .auth
        .issue_vendor_token(vendor["id"].as_i64().unwrap() as i32)
        .expect("vendor token");

    let response = app
        .request(
            Method::POST,
            "/api/v1/bids",
            Some(json!({
                "rfqId": rfq_id,
                "items": [{
                    "medicine_name": "Paracetamol 500mg",
                    "item_quantity": 100,
                    "item_price": "2.50"
                }]
            })),
            Some(&vendor_token),
        )
        .await;
    read_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;
}

#[tokio::test]
async fn admin_lists_vendors_by_status() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.seed_admin().await;
    app.seed_approved_vendor("PharmaDirect Ltd").await;

    let response = app
        .request(Method::POST, "/api/v1/vendors/register", Some(registration("l1")), None)
        .await;
    read_json(response, StatusCode::CREATED).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/vendors?status=PENDING",
            None,
            Some(&admin_token),
        )
        .await;
    let pending = read_json(response, StatusCode::OK).await;
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["status"], "PENDING");

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/vendors?status=APPROVED",
            None,
            Some(&admin_token),
        )
        .await;
    let approved = read_json(response, StatusCode::OK).await;
    assert_eq!(approved.as_array().unwrap().len(), 1);

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/vendors?status=ALL",
            None,
            Some(&admin_token),
        )
        .await;
    let all = read_json(response, StatusCode::OK).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/vendors?status=FROZEN",
            None,
            Some(&admin_token),
        )
        .await;
    read_json(response, StatusCode::BAD_REQUEST).await;

    // Staff without the admin role are turned away.
    let (_, manager_token, _) = app.seed_store_with_staff("Central Pharmacy").await;
    let response = app
        .request(Method::GET, "/api/v1/admin/vendors", None, Some(&manager_token))
        .await;
    read_json(response, StatusCode::UNAUTHORIZED).await;
}
