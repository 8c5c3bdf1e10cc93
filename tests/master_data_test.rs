mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;

use common::TestDb;
use protektor_api::{
    errors::ServiceError,
    services::categories::{CategoryService, CreateCategoryRequest, UpdateCategoryRequest},
    services::clients::{
        ClientService, CreateClientRequest, CreatePhoneRequest, UpdateClientRequest,
    },
    services::products::{CreateProductRequest, ProductService, UpdateProductRequest},
};
use uuid::Uuid;

fn client_request(business_name: &str, tax_id: Option<&str>) -> CreateClientRequest {
    CreateClientRequest {
        business_name: business_name.to_string(),
        tax_id: tax_id.map(str::to_string),
        email: None,
        legal_address: None,
        phones: vec![CreatePhoneRequest {
            number: "+58-212-5550101".to_string(),
            label: Some("office".to_string()),
        }],
    }
}

#[tokio::test]
async fn category_crud_round_trip() {
    let harness = TestDb::new().await;
    let service = CategoryService::new(harness.db.clone(), harness.event_sender.clone());

    let created = service
        .create_category(CreateCategoryRequest {
            name: "Regulators".to_string(),
            description: Some("Voltage regulators".to_string()),
        })
        .await
        .expect("create should succeed");

    let duplicate = service
        .create_category(CreateCategoryRequest {
            name: "Regulators".to_string(),
            description: None,
        })
        .await;
    assert_matches!(duplicate, Err(ServiceError::Conflict(_)));

    let fetched = service.get_category(created.id).await.expect("get");
    assert_eq!(fetched.name, "Regulators");

    let updated = service
        .update_category(
            created.id,
            UpdateCategoryRequest {
                name: Some("Voltage Regulators".to_string()),
                description: None,
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.name, "Voltage Regulators");

    service
        .delete_category(created.id)
        .await
        .expect("delete should succeed");

    let gone = service.get_category(created.id).await;
    assert_matches!(gone, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn product_crud_round_trip() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = ProductService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;

    let created = service
        .create_product(CreateProductRequest {
            model: "PRD-110".to_string(),
            description: Some("110V regulator".to_string()),
            category_id: cat.id,
            price: dec!(125.50),
            price_distribution: dec!(110.00),
            stock: 25,
            min_stock: 10,
            image_url: None,
        })
        .await
        .expect("create should succeed");
    assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Regulators"));

    let duplicate = service
        .create_product(CreateProductRequest {
            model: "PRD-110".to_string(),
            description: None,
            category_id: cat.id,
            price: dec!(99.00),
            price_distribution: dec!(0.00),
            stock: 0,
            min_stock: 10,
            image_url: None,
        })
        .await;
    assert_matches!(duplicate, Err(ServiceError::Conflict(_)));

    let unknown_category = service
        .create_product(CreateProductRequest {
            model: "PAR-220".to_string(),
            description: None,
            category_id: Uuid::new_v4(),
            price: dec!(80.00),
            price_distribution: dec!(0.00),
            stock: 0,
            min_stock: 10,
            image_url: None,
        })
        .await;
    assert_matches!(unknown_category, Err(ServiceError::NotFound(_)));

    let by_model = service
        .get_product_by_model("PRD-110")
        .await
        .expect("lookup by model");
    assert_eq!(by_model.id, created.id);

    let updated = service
        .update_product(
            created.id,
            UpdateProductRequest {
                model: None,
                description: None,
                category_id: None,
                price: Some(dec!(130.00)),
                price_distribution: None,
                min_stock: Some(5),
                image_url: None,
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.price, dec!(130.00));
    assert_eq!(updated.min_stock, 5);
    // stock is not touched by master-data updates
    assert_eq!(updated.stock, 25);

    service
        .delete_product(created.id)
        .await
        .expect("delete should succeed");
    let gone = service.get_product(created.id).await;
    assert_matches!(gone, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn product_listing_shows_only_in_stock_items() {
    let harness = TestDb::new().await;
    let db = &*harness.db;
    let service = ProductService::new(harness.db.clone(), harness.event_sender.clone());

    let cat = common::seed_category(db, "Regulators").await;
    common::seed_product(db, cat.id, "PRD-110", 25, dec!(125.50)).await;
    common::seed_product(db, cat.id, "PAR-220", 0, dec!(80.00)).await;

    let listed = service.list_products().await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].model, "PRD-110");
}

#[tokio::test]
async fn client_crud_round_trip_with_phones() {
    let harness = TestDb::new().await;
    let service = ClientService::new(harness.db.clone(), harness.event_sender.clone());

    let created = service
        .create_client(client_request("Tech Solutions Corp", Some("J-123456789")))
        .await
        .expect("create should succeed");
    assert_eq!(created.phones.len(), 1);

    let duplicate_tax_id = service
        .create_client(client_request("Another Corp", Some("J-123456789")))
        .await;
    assert_matches!(duplicate_tax_id, Err(ServiceError::Conflict(_)));

    let fetched = service.get_client(created.id).await.expect("get");
    assert_eq!(fetched.business_name, "Tech Solutions Corp");
    assert_eq!(fetched.phones.len(), 1);

    let phone = service
        .add_phone(
            created.id,
            CreatePhoneRequest {
                number: "+58-414-5550202".to_string(),
                label: Some("mobile".to_string()),
            },
        )
        .await
        .expect("add phone");

    let updated = service
        .update_client(
            created.id,
            UpdateClientRequest {
                business_name: None,
                tax_id: None,
                email: Some("contact@techsolutions.com".to_string()),
                legal_address: None,
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.email.as_deref(), Some("contact@techsolutions.com"));
    assert_eq!(updated.phones.len(), 2);

    service.remove_phone(phone.id).await.expect("remove phone");
    let missing_phone = service.remove_phone(phone.id).await;
    assert_matches!(missing_phone, Err(ServiceError::NotFound(_)));

    service
        .delete_client(created.id)
        .await
        .expect("delete should succeed");
    let gone = service.get_client(created.id).await;
    assert_matches!(gone, Err(ServiceError::NotFound(_)));

    let listed = service.list_clients().await.expect("list");
    assert!(listed.is_empty());
}
