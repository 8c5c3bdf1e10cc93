mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;

use common::{line_item, order, purchase_request, TestDb};
use protektor_api::{
    entities::load::LoadType,
    errors::ServiceError,
    services::loads::{CreatePurchaseLoadRequest, CreateSalesLoadRequest, LoadData, LoadService},
};
use uuid::Uuid;

#[tokio::test]
async fn persisted_sales_load_reconstructs_as_orders() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 100, dec!(125.50)).await;

    let order_date = Utc::now();
    let submitted = order(
        "ORDER-123",
        "Comercial Andina",
        order_date,
        vec![line_item(&p, 30, dec!(125.50))],
    );
    let sheet_id = submitted.id;

    let summary = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_MAY2025.xlsx".to_string(),
            data: vec![submitted],
        })
        .await
        .expect("load should succeed");

    let response = service
        .get_load_data(summary.load_id)
        .await
        .expect("read path should succeed");

    assert_eq!(response.file_type, "order");
    let orders = match response.data {
        LoadData::Orders(orders) => orders,
        LoadData::PurchaseRequests(_) => panic!("sales load must reconstruct as orders"),
    };

    assert_eq!(orders.len(), 1);
    let reconstructed = &orders[0];
    assert_eq!(reconstructed.id, sheet_id);
    assert_eq!(reconstructed.client_name, "Comercial Andina");
    assert_eq!(reconstructed.sheet_name, "ORDER-123");
    assert_eq!(reconstructed.products.len(), 1);

    let item = &reconstructed.products[0];
    assert_eq!(item.id, p.id);
    assert_eq!(item.model, "PRD-110");
    assert_eq!(item.price, dec!(125.50));
    assert_eq!(item.quantity, 30);
    assert_eq!(item.total, dec!(3765.00));
    assert_eq!(item.category.as_deref(), Some("Regulators"));
    assert_eq!(reconstructed.total, dec!(3765.00));
}

#[tokio::test]
async fn persisted_purchase_load_reconstructs_as_purchase_requests() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Surge Protectors").await;
    let a = common::seed_product(db, cat.id, "PRD-110", 0, dec!(125.50)).await;
    let b = common::seed_product(db, cat.id, "PAR-220", 0, dec!(80.00)).await;

    let summary = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "PURCHASES_MAY2025.xlsx".to_string(),
            data: vec![purchase_request(
                "SHEET-1",
                Utc::now(),
                vec![line_item(&a, 10, dec!(90.00)), line_item(&b, 4, dec!(64.00))],
            )],
        })
        .await
        .expect("load should succeed");

    let response = service
        .get_load_data(summary.load_id)
        .await
        .expect("read path should succeed");

    assert_eq!(response.file_type, "purchase_request");
    let requests = match response.data {
        LoadData::PurchaseRequests(requests) => requests,
        LoadData::Orders(_) => panic!("purchase load must reconstruct as purchase requests"),
    };

    assert_eq!(requests.len(), 1);
    let reconstructed = &requests[0];
    assert_eq!(reconstructed.products.len(), 2);
    // 10 * 90.00 + 4 * 64.00
    assert_eq!(reconstructed.total_cost, dec!(1156.00));
}

#[tokio::test]
async fn unknown_load_is_not_found() {
    let harness = TestDb::new().await;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let result = service.get_load_data(Uuid::new_v4()).await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn history_lists_loads_newest_first() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 100, dec!(125.50)).await;

    service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "FIRST.xlsx".to_string(),
            data: vec![purchase_request(
                "SHEET-1",
                Utc::now(),
                vec![line_item(&p, 5, dec!(90.00))],
            )],
        })
        .await
        .expect("first load should succeed");

    service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "SECOND.xlsx".to_string(),
            data: vec![order(
                "ORDER-1",
                "Comercial Andina",
                Utc::now(),
                vec![line_item(&p, 5, dec!(125.50))],
            )],
        })
        .await
        .expect("second load should succeed");

    let history = service
        .get_loads_history()
        .await
        .expect("history should succeed");

    assert_eq!(history.len(), 2);
    assert!(history[0].load_date >= history[1].load_date);
    assert_eq!(history[0].file_name, "SECOND.xlsx");
    assert_eq!(history[0].load_type, LoadType::Sale);
    assert_eq!(history[1].file_name, "FIRST.xlsx");
    assert_eq!(history[1].load_type, LoadType::Purchase);
}
