//! Record shapes produced by the external spreadsheet extractor and
//! reconstructed by the load read path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One parsed spreadsheet row: a product reference plus movement data.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItem {
    /// Product id the row refers to
    pub id: Uuid,
    pub model: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// One sales sheet: a client order with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Order {
    /// Sheet id assigned by the extractor
    pub id: Uuid,
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,
    pub order_date: DateTime<Utc>,
    pub products: Vec<LineItem>,
    pub total: Decimal,
    #[validate(length(min = 1, max = 100, message = "Sheet name is required"))]
    pub sheet_name: String,
}

/// One purchase sheet: an incoming stock request with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseRequest {
    /// Sheet id assigned by the extractor
    pub id: Uuid,
    pub request_date: DateTime<Utc>,
    pub products: Vec<LineItem>,
    pub total_cost: Decimal,
    #[validate(length(min = 1, max = 100, message = "Sheet name is required"))]
    pub sheet_name: String,
}
