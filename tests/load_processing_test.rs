mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{line_item, order, purchase_request, TestDb};
use protektor_api::{
    entities::{
        client::Entity as ClientEntity,
        load::{Entity as LoadEntity, LoadType},
        product::Entity as ProductEntity,
        sheet_load::{self, Entity as SheetLoadEntity},
        transaction::{self, Entity as TransactionEntity, TransactionType},
    },
    errors::ServiceError,
    models::LineItem,
    services::loads::{CreatePurchaseLoadRequest, CreateSalesLoadRequest, LoadService},
};
use uuid::Uuid;

async fn stock_of(db: &protektor_api::db::DbPool, product_id: Uuid) -> i32 {
    ProductEntity::find_by_id(product_id)
        .one(db)
        .await
        .expect("query failed")
        .expect("product missing")
        .stock
}

#[tokio::test]
async fn purchase_load_increases_stock_and_persists_graph() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Surge Protectors").await;
    let a = common::seed_product(db, cat.id, "PRD-110", 10, dec!(125.50)).await;
    let b = common::seed_product(db, cat.id, "PAR-220", 0, dec!(80.00)).await;

    let sheet = purchase_request(
        "MAY-REQUEST",
        Utc::now(),
        vec![line_item(&a, 50, dec!(100.00)), line_item(&b, 20, dec!(64.00))],
    );
    let sheet_id = sheet.id;

    let summary = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "PURCHASES_MAY2025.xlsx".to_string(),
            data: vec![sheet],
        })
        .await
        .expect("purchase load should succeed");

    assert!(summary.success);
    assert_eq!(summary.load_type, LoadType::Purchase);
    assert_eq!(summary.file_name, "PURCHASES_MAY2025.xlsx");
    assert_eq!(summary.total_sheets, 1);
    assert_eq!(summary.total_transactions, 2);

    assert_eq!(stock_of(db, a.id).await, 60);
    assert_eq!(stock_of(db, b.id).await, 20);

    let load = LoadEntity::find_by_id(summary.load_id)
        .one(db)
        .await
        .unwrap()
        .expect("load row persisted");
    assert_eq!(load.load_type, LoadType::Purchase);

    let sheets = SheetLoadEntity::find()
        .filter(sheet_load::Column::LoadId.eq(summary.load_id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].id, sheet_id);
    assert_eq!(sheets[0].client_id, None);

    let transactions = TransactionEntity::find()
        .filter(transaction::Column::SheetLoadId.eq(sheet_id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 2);
    assert!(transactions
        .iter()
        .all(|t| t.r#type == TransactionType::In));
}

#[tokio::test]
async fn sales_load_decreases_stock_and_links_client() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 100, dec!(125.50)).await;

    let summary = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_MAY2025.xlsx".to_string(),
            data: vec![order(
                "ORDER-123",
                "Comercial Andina",
                Utc::now(),
                vec![line_item(&p, 30, dec!(125.50))],
            )],
        })
        .await
        .expect("sales load should succeed");

    assert_eq!(summary.load_type, LoadType::Sale);
    assert_eq!(summary.total_transactions, 1);
    assert_eq!(stock_of(db, p.id).await, 70);

    let sheets = SheetLoadEntity::find()
        .filter(sheet_load::Column::LoadId.eq(summary.load_id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(sheets.len(), 1);

    let client_id = sheets[0].client_id.expect("sale sheet must link a client");
    let client = ClientEntity::find_by_id(client_id)
        .one(db)
        .await
        .unwrap()
        .expect("client row persisted");
    assert_eq!(client.business_name, "Comercial Andina");

    let transactions = TransactionEntity::find()
        .filter(transaction::Column::SheetLoadId.eq(sheets[0].id))
        .all(db)
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].r#type, TransactionType::Out);
    assert_eq!(transactions[0].quantity, 30);
    assert_eq!(transactions[0].unit_price, dec!(125.50));
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 10, dec!(125.50)).await;

    let result = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_JUNE2025.xlsx".to_string(),
            data: vec![order(
                "ORDER-200",
                "Comercial Andina",
                Utc::now(),
                vec![line_item(&p, 15, dec!(125.50))],
            )],
        })
        .await;

    assert_matches!(result, Err(ServiceError::InsufficientStock(_)));

    assert_eq!(stock_of(db, p.id).await, 10);
    assert_eq!(LoadEntity::find().count(db).await.unwrap(), 0);
    assert_eq!(SheetLoadEntity::find().count(db).await.unwrap(), 0);
    assert_eq!(TransactionEntity::find().count(db).await.unwrap(), 0);
    // the client resolved for the failed sheet must be rolled back too
    assert_eq!(ClientEntity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_product_rolls_back_earlier_sheets() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 40, dec!(125.50)).await;

    let missing = LineItem {
        id: Uuid::new_v4(),
        model: "GHOST-1".to_string(),
        description: None,
        price: dec!(10.00),
        quantity: 5,
        total: dec!(50.00),
        image_url: None,
        category: None,
    };

    let result = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "PURCHASES_JUNE2025.xlsx".to_string(),
            data: vec![
                purchase_request("SHEET-1", Utc::now(), vec![line_item(&p, 25, dec!(90.00))]),
                purchase_request("SHEET-2", Utc::now(), vec![missing]),
            ],
        })
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));

    // the first sheet already increased stock inside the transaction; the
    // rollback must undo it
    assert_eq!(stock_of(db, p.id).await, 40);
    assert_eq!(LoadEntity::find().count(db).await.unwrap(), 0);
    assert_eq!(SheetLoadEntity::find().count(db).await.unwrap(), 0);
    assert_eq!(TransactionEntity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn later_items_see_stock_mutated_by_earlier_items() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 10, dec!(125.50)).await;

    // 6 + 5 exceeds the running stock even though each item alone fits
    let result = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_A.xlsx".to_string(),
            data: vec![order(
                "ORDER-300",
                "Comercial Andina",
                Utc::now(),
                vec![
                    line_item(&p, 6, dec!(125.50)),
                    line_item(&p, 5, dec!(125.50)),
                ],
            )],
        })
        .await;
    assert_matches!(result, Err(ServiceError::InsufficientStock(_)));
    assert_eq!(stock_of(db, p.id).await, 10);

    // 6 + 4 consumes the stock exactly
    let summary = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_B.xlsx".to_string(),
            data: vec![order(
                "ORDER-301",
                "Comercial Andina",
                Utc::now(),
                vec![
                    line_item(&p, 6, dec!(125.50)),
                    line_item(&p, 4, dec!(125.50)),
                ],
            )],
        })
        .await
        .expect("exact consumption should succeed");

    assert_eq!(summary.total_transactions, 2);
    assert_eq!(stock_of(db, p.id).await, 0);
}

#[tokio::test]
async fn duplicate_file_name_is_a_conflict() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 10, dec!(125.50)).await;

    service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "PURCHASES.xlsx".to_string(),
            data: vec![purchase_request(
                "SHEET-1",
                Utc::now(),
                vec![line_item(&p, 5, dec!(90.00))],
            )],
        })
        .await
        .expect("first load should succeed");

    let result = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "PURCHASES.xlsx".to_string(),
            data: vec![purchase_request(
                "SHEET-2",
                Utc::now(),
                vec![line_item(&p, 5, dec!(90.00))],
            )],
        })
        .await;

    assert_matches!(result, Err(ServiceError::Conflict(_)));
    // the conflicting load must not have touched stock (15, not 20)
    assert_eq!(stock_of(db, p.id).await, 15);
}

#[tokio::test]
async fn malformed_input_is_rejected_before_any_write() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 10, dec!(125.50)).await;

    let empty_batch = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "EMPTY.xlsx".to_string(),
            data: vec![],
        })
        .await;
    assert_matches!(empty_batch, Err(ServiceError::ValidationError(_)));

    let zero_quantity = service
        .process_purchase_load(CreatePurchaseLoadRequest {
            file_name: "BAD_QTY.xlsx".to_string(),
            data: vec![purchase_request(
                "SHEET-1",
                Utc::now(),
                vec![line_item(&p, 0, dec!(90.00))],
            )],
        })
        .await;
    assert_matches!(zero_quantity, Err(ServiceError::ValidationError(_)));

    let free_price = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "BAD_PRICE.xlsx".to_string(),
            data: vec![order(
                "ORDER-1",
                "Comercial Andina",
                Utc::now(),
                vec![line_item(&p, 1, dec!(0.00))],
            )],
        })
        .await;
    assert_matches!(free_price, Err(ServiceError::ValidationError(_)));

    assert_eq!(LoadEntity::find().count(db).await.unwrap(), 0);
    assert_eq!(stock_of(db, p.id).await, 10);
}

#[tokio::test]
async fn multi_sheet_load_accumulates_counts() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = LoadService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let a = common::seed_product(db, cat.id, "PRD-110", 100, dec!(125.50)).await;
    let b = common::seed_product(db, cat.id, "PAR-220", 100, dec!(80.00)).await;

    let summary = service
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS_MULTI.xlsx".to_string(),
            data: vec![
                order(
                    "ORDER-1",
                    "Comercial Andina",
                    Utc::now(),
                    vec![line_item(&a, 10, dec!(125.50)), line_item(&b, 5, dec!(80.00))],
                ),
                order(
                    "ORDER-2",
                    "Ferreteria Central",
                    Utc::now(),
                    vec![line_item(&a, 7, dec!(125.50))],
                ),
            ],
        })
        .await
        .expect("multi-sheet load should succeed");

    assert_eq!(summary.total_sheets, 2);
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(stock_of(db, a.id).await, 83);
    assert_eq!(stock_of(db, b.id).await, 95);
    assert_eq!(ClientEntity::find().count(db).await.unwrap(), 2);
}
