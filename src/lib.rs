//! PharmaNet API Library
//!
//! Procurement and inventory backend for a pharmacy chain: vendor
//! onboarding, RFQ issuing and bidding, award decisions, per-store
//! inventories and stock replenishment requests.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod tracing;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let db = Arc::new(db);
        let auth = Arc::new(auth::AuthService::new(
            &config.jwt_secret,
            config.jwt_expiration,
        ));
        let services = handlers::AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            auth.clone(),
        );
        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

/// All versioned API routes.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/vendors", handlers::vendors::vendor_routes())
        .nest(
            "/admin",
            handlers::vendors::vendor_admin_routes()
                .merge(handlers::stores::store_admin_routes()),
        )
        .nest("/rfqs", handlers::rfqs::rfq_routes())
        .nest("/bids", handlers::bids::bid_routes())
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest(
            "/stock-requests",
            handlers::stock_requests::stock_request_routes(),
        )
}

/// Builds the application router with middleware applied.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .layer(axum::middleware::from_fn(
            tracing::request_meta_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}

async fn api_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pharmanet-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };
    Json(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
