//! Protektor API Library
//!
//! This crate provides the core functionality for the Protektor inventory API
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

// API routes
pub fn api_v1_routes() -> Router<AppState> {
    let loads = Router::new()
        .route("/loads", get(handlers::loads::get_loads_history))
        .route(
            "/loads/purchases",
            post(handlers::loads::process_purchase_load),
        )
        .route("/loads/sales", post(handlers::loads::process_sales_load))
        .route("/loads/:id", get(handlers::loads::get_load_data))
        .route("/loads/:id/revert", post(handlers::loads::revert_load));

    let products = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/products/by-model/:model",
            get(handlers::products::get_product_by_model),
        );

    let categories = Router::new()
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        );

    let clients = Router::new()
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/:id",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/clients/:id/phones", post(handlers::clients::add_phone))
        .route(
            "/clients/phones/:phone_id",
            axum::routing::delete(handlers::clients::remove_phone),
        );

    let metrics = Router::new().route(
        "/metrics/dashboard",
        get(handlers::metrics::get_dashboard_metrics),
    );

    Router::new()
        .merge(loads)
        .merge(products)
        .merge(categories)
        .merge(clients)
        .merge(metrics)
}
