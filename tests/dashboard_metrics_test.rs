mod common;

use chrono::{Datelike, Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use common::{line_item, order, TestDb};
use protektor_api::{
    entities::{load, sheet_load, transaction},
    services::loads::{CreateSalesLoadRequest, LoadService},
    services::metrics::MetricsService,
};

#[tokio::test]
async fn dashboard_metrics_aggregate_products_and_sales() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let loads = LoadService::new(harness.db.clone(), harness.event_sender.clone());
    let metrics = MetricsService::new(harness.db.clone());

    let cat = common::seed_category(db, "Regulators").await;
    // min_stock is 10, so stock 5 counts as low and stock 0 does not
    let a = common::seed_product(db, cat.id, "PRD-110", 100, dec!(10.00)).await;
    let b = common::seed_product(db, cat.id, "PAR-220", 5, dec!(20.00)).await;
    let _c = common::seed_product(db, cat.id, "SPD-1320", 0, dec!(30.00)).await;

    loads
        .process_sales_load(CreateSalesLoadRequest {
            file_name: "ORDERS.xlsx".to_string(),
            data: vec![order(
                "ORDER-1",
                "Comercial Andina",
                Utc::now(),
                vec![
                    line_item(&a, 40, dec!(10.00)),
                    line_item(&b, 2, dec!(20.00)),
                ],
            )],
        })
        .await
        .expect("sales load should succeed");

    let dashboard = metrics
        .get_dashboard_metrics()
        .await
        .expect("metrics should succeed");

    // stock after the sale: a=60, b=3, c=0
    assert_eq!(dashboard.summary.total_stock, 63);
    // 60*10 + 3*20 + 0*30
    assert_eq!(dashboard.summary.total_value, dec!(660.00));
    assert_eq!(dashboard.summary.low_stock_count, 1);

    assert_eq!(dashboard.top_products.len(), 2);
    assert_eq!(dashboard.top_products[0].model, "PRD-110");
    assert_eq!(dashboard.top_products[0].units, 40);
    assert_eq!(dashboard.top_products[1].model, "PAR-220");
    assert_eq!(dashboard.top_products[1].units, 2);

    // only in-stock products, largest first
    assert_eq!(dashboard.stock_distribution.len(), 2);
    assert_eq!(dashboard.stock_distribution[0].model, "PRD-110");
    assert_eq!(dashboard.stock_distribution[0].units, 60);
    assert_eq!(dashboard.stock_distribution[1].model, "PAR-220");
    assert_eq!(dashboard.stock_distribution[1].units, 3);

    // six zero-filled buckets ending in the current month
    assert_eq!(dashboard.monthly_trend.len(), 6);
    let now = Utc::now();
    let current = format!("{:04}-{:02}", now.year(), now.month());
    let last = dashboard.monthly_trend.last().unwrap();
    assert_eq!(last.month, current);
    assert_eq!(last.units, 42);
    assert!(dashboard.monthly_trend[..5].iter().all(|m| m.units == 0));
}

#[tokio::test]
async fn last_month_sold_counts_only_the_previous_calendar_month() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let metrics = MetricsService::new(harness.db.clone());

    let cat = common::seed_category(db, "Regulators").await;
    let p = common::seed_product(db, cat.id, "PRD-110", 100, dec!(10.00)).await;

    // a ledger entry from roughly the middle of last month, inserted directly
    let last_month_date = Utc::now()
        .with_day(1)
        .expect("first of month is valid")
        - Duration::days(15);

    let load_model = load::ActiveModel {
        id: Set(Uuid::new_v4()),
        file_name: Set("HISTORIC.xlsx".to_string()),
        load_type: Set(load::LoadType::Sale),
        load_date: Set(last_month_date),
    }
    .insert(db)
    .await
    .expect("load insert");

    let sheet_model = sheet_load::ActiveModel {
        id: Set(Uuid::new_v4()),
        load_id: Set(load_model.id),
        sheet_name: Set("ORDER-OLD".to_string()),
        client_id: Set(None),
        processed_date: Set(last_month_date),
    }
    .insert(db)
    .await
    .expect("sheet insert");

    transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(p.id),
        r#type: Set(transaction::TransactionType::Out),
        quantity: Set(17),
        unit_price: Set(dec!(10.00)),
        transaction_date: Set(last_month_date),
        sheet_load_id: Set(sheet_model.id),
    }
    .insert(db)
    .await
    .expect("transaction insert");

    let dashboard = metrics
        .get_dashboard_metrics()
        .await
        .expect("metrics should succeed");

    assert_eq!(dashboard.summary.last_month_sold, 17);
}
