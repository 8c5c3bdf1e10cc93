use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use protektor_api::{
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    entities::{category, client, product},
    events::{Event, EventSender},
    models::{LineItem, Order, PurchaseRequest},
};

/// Harness holding a fresh in-memory SQLite database plus an event channel.
///
/// The pool is capped at one connection so the private `:memory:` database is
/// shared by everything in the test.
pub struct TestDb {
    pub db: Arc<DbPool>,
    pub event_sender: EventSender,
    _event_rx: mpsc::Receiver<Event>,
}

impl TestDb {
    pub async fn new() -> Self {
        let config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let db = establish_connection_with_config(&config)
            .await
            .expect("Failed to create test database");
        run_migrations(&db).await.expect("Failed to run migrations");

        let (tx, rx) = mpsc::channel(256);

        Self {
            db: Arc::new(db),
            event_sender: EventSender::new(tx),
            _event_rx: rx,
        }
    }
}

pub async fn seed_category(db: &DbPool, name: &str) -> category::Model {
    category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed category")
}

pub async fn seed_product(
    db: &DbPool,
    category_id: Uuid,
    model: &str,
    stock: i32,
    price: Decimal,
) -> product::Model {
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        model: Set(model.to_string()),
        description: Set(Some(format!("{} test unit", model))),
        category_id: Set(category_id),
        price: Set(price),
        price_distribution: Set(Decimal::ZERO),
        stock: Set(stock),
        min_stock: Set(10),
        image_url: Set(None),
        last_updated: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_client(db: &DbPool, business_name: &str) -> client::Model {
    client::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_name: Set(business_name.to_string()),
        tax_id: Set(None),
        email: Set(None),
        legal_address: Set(None),
        registration_date: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed client")
}

pub fn line_item(product: &product::Model, quantity: i32, price: Decimal) -> LineItem {
    LineItem {
        id: product.id,
        model: product.model.clone(),
        description: product.description.clone(),
        price,
        quantity,
        total: price * Decimal::from(quantity),
        image_url: None,
        category: None,
    }
}

pub fn order(
    sheet_name: &str,
    client_name: &str,
    order_date: DateTime<Utc>,
    products: Vec<LineItem>,
) -> Order {
    let total = products.iter().map(|i| i.total).sum();
    Order {
        id: Uuid::new_v4(),
        client_name: client_name.to_string(),
        order_date,
        products,
        total,
        sheet_name: sheet_name.to_string(),
    }
}

pub fn purchase_request(
    sheet_name: &str,
    request_date: DateTime<Utc>,
    products: Vec<LineItem>,
) -> PurchaseRequest {
    let total_cost = products.iter().map(|i| i.total).sum();
    PurchaseRequest {
        id: Uuid::new_v4(),
        request_date,
        products,
        total_cost,
        sheet_name: sheet_name.to_string(),
    }
}
