use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use pharmanet_api::{
    config::AppConfig,
    db,
    entities::users::StaffRole,
    events::{self, EventSender},
    services::stores::{CreateStaffUserInput, CreateStoreInput},
    services::vendors::{RegisterVendorInput, UploadDocumentInput},
    AppState,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(pool, cfg, event_sender));
        let router = pharmanet_api::app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Stops the background event consumer and drops its receiver, so any
    /// later event send fails. Lets tests check that committed mutations
    /// still report success when event logging is down.
    #[allow(dead_code)]
    pub async fn stop_event_consumer(&mut self) {
        self._event_task.abort();
        let _ = (&mut self._event_task).await;
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed an admin account and return (user_id, bearer token).
    pub async fn seed_admin(&self) -> (i32, String) {
        let admin = self
            .state
            .services
            .stores
            .create_staff_user(CreateStaffUserInput {
                name: "Head Office Admin".to_string(),
                email: format!("admin{}@pharmanet.test", rand_suffix()),
                password: "password123".to_string(),
                phone_number: None,
                role: StaffRole::Admin,
            })
            .await
            .expect("seed admin");
        let token = self
            .state
            .auth
            .issue_staff_token(admin.id, StaffRole::Admin, None)
            .expect("admin token");
        (admin.id, token)
    }

    /// Seed a store with an assigned manager and pharmacist. Returns
    /// (store_id, manager token, pharmacist token).
    pub async fn seed_store_with_staff(&self, store_name: &str) -> (i32, String, String) {
        let stores = &self.state.services.stores;
        let store = stores
            .create_store(CreateStoreInput {
                store_name: store_name.to_string(),
                location: "Test Town".to_string(),
            })
            .await
            .expect("seed store");

        let manager = stores
            .create_staff_user(CreateStaffUserInput {
                name: format!("{} Manager", store_name),
                email: format!("manager{}@pharmanet.test", rand_suffix()),
                password: "password123".to_string(),
                phone_number: None,
                role: StaffRole::Manager,
            })
            .await
            .expect("seed manager");
        stores
            .assign_manager(store.id, manager.id)
            .await
            .expect("assign manager");

        let pharmacist = stores
            .create_staff_user(CreateStaffUserInput {
                name: format!("{} Pharmacist", store_name),
                email: format!("pharmacist{}@pharmanet.test", rand_suffix()),
                password: "password123".to_string(),
                phone_number: None,
                role: StaffRole::Pharmacist,
            })
            .await
            .expect("seed pharmacist");
        stores
            .assign_pharmacist(store.id, pharmacist.id)
            .await
            .expect("assign pharmacist");

        let manager_token = self
            .state
            .auth
            .issue_staff_token(manager.id, StaffRole::Manager, Some(store.id))
            .expect("manager token");
        let pharmacist_token = self
            .state
            .auth
            .issue_staff_token(pharmacist.id, StaffRole::Pharmacist, Some(store.id))
            .expect("pharmacist token");

        (store.id, manager_token, pharmacist_token)
    }

    /// Register a vendor, push it through document verification and approval,
    /// and return (vendor_id, bearer token).
    pub async fn seed_approved_vendor(&self, business_name: &str) -> (i32, String) {
        let (admin_id, _) = self.seed_admin().await;
        let vendors = &self.state.services.vendors;
        let suffix = rand_suffix();

        let vendor = vendors
            .register(RegisterVendorInput {
                business_name: business_name.to_string(),
                email: format!("vendor{}@pharmanet.test", suffix),
                password: "password123".to_string(),
                gst_number: format!("GST-{}", suffix),
                license_number: format!("LIC-{}", suffix),
                address: "12 Supply Road".to_string(),
            })
            .await
            .expect("register vendor");

        let document = vendors
            .upload_document(
                vendor.id,
                UploadDocumentInput {
                    doc_type: "DRUG_LICENSE".to_string(),
                    file_url: "https://files.test/license.pdf".to_string(),
                },
            )
            .await
            .expect("upload vendor document");
        vendors
            .verify_document(admin_id, document.id, None)
            .await
            .expect("verify vendor document");
        vendors
            .approve_vendor(vendor.id, None)
            .await
            .expect("approve vendor");

        let token = self
            .state
            .auth
            .issue_vendor_token(vendor.id)
            .expect("vendor token");
        (vendor.id, token)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a JSON body from a response, asserting the expected status first.
pub async fn read_json(response: axum::response::Response, expected: StatusCode) -> Value {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    assert_eq!(
        status,
        expected,
        "unexpected status, body: {}",
        String::from_utf8_lossy(&bytes)
    );
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    }
}

fn rand_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
