use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 100, message = "Product model is required"))]
    pub model: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub price: Decimal,
    #[serde(default)]
    pub price_distribution: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_min_stock")]
    pub min_stock: i32,
    pub image_url: Option<String>,
}

fn default_min_stock() -> i32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 100, message = "Product model cannot be empty"))]
    pub model: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub price_distribution: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub model: String,
    pub description: Option<String>,
    pub category: Option<CategoryInfo>,
    pub price: Decimal,
    pub price_distribution: Decimal,
    pub stock: i32,
    pub min_stock: i32,
    pub image_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Service for product master data. Stock is never mutated here; only load
/// processing and reversal touch it.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Product price must be strictly positive".to_string(),
            ));
        }
        if request.stock < 0 || request.min_stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock levels cannot be negative".to_string(),
            ));
        }

        let db = &*self.db;

        CategoryEntity::find_by_id(request.category_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Category with id {} not found",
                    request.category_id
                ))
            })?;

        let product_id = Uuid::new_v4();
        let active = product::ActiveModel {
            id: Set(product_id),
            model: Set(request.model.clone()),
            description: Set(request.description),
            category_id: Set(request.category_id),
            price: Set(request.price),
            price_distribution: Set(request.price_distribution),
            stock: Set(request.stock),
            min_stock: Set(request.min_stock),
            image_url: Set(request.image_url),
            last_updated: Set(Utc::now()),
        };

        let created = active
            .insert(db)
            .await
            .map_err(|e| ServiceError::from_db(e, "Product model already exists"))?;

        info!(product_id = %product_id, model = %created.model, "Product created");

        if let Err(e) = self.event_sender.send(Event::ProductCreated(product_id)).await {
            warn!(error = %e, product_id = %product_id, "Failed to send product created event");
        }

        self.with_category(created).await
    }

    /// Lists in-stock products, ordered by model code
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let db = &*self.db;

        let products = ProductEntity::find()
            .find_also_related(CategoryEntity)
            .filter(product::Column::Stock.gt(0))
            .order_by_asc(product::Column::Model)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(products
            .into_iter()
            .map(|(p, c)| to_response(p, c))
            .collect())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        let db = &*self.db;

        let found = ProductEntity::find_by_id(product_id)
            .find_also_related(CategoryEntity)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with id {} not found", product_id))
            })?;

        Ok(to_response(found.0, found.1))
    }

    #[instrument(skip(self), fields(model = %model))]
    pub async fn get_product_by_model(&self, model: &str) -> Result<ProductResponse, ServiceError> {
        let db = &*self.db;

        let found = ProductEntity::find()
            .find_also_related(CategoryEntity)
            .filter(product::Column::Model.eq(model))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with model {} not found", model))
            })?;

        Ok(to_response(found.0, found.1))
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if matches!(request.price, Some(p) if p <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Product price must be strictly positive".to_string(),
            ));
        }

        let db = &*self.db;

        let product_model = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with id {} not found", product_id))
            })?;

        if let Some(category_id) = request.category_id {
            CategoryEntity::find_by_id(category_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category with id {} not found", category_id))
                })?;
        }

        let mut active: product::ActiveModel = product_model.into();
        if let Some(model) = request.model {
            active.model = Set(model);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = request.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(price_distribution) = request.price_distribution {
            active.price_distribution = Set(price_distribution);
        }
        if let Some(min_stock) = request.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_db(e, "Cannot update to existing product model"))?;

        if let Err(e) = self.event_sender.send(Event::ProductUpdated(product_id)).await {
            warn!(error = %e, product_id = %product_id, "Failed to send product updated event");
        }

        self.with_category(updated).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = ProductEntity::delete_by_id(product_id)
            .exec(db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::Conflict(
                    "Product is referenced by recorded transactions".to_string(),
                ),
                _ => ServiceError::DatabaseError(e),
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product with id {} not found",
                product_id
            )));
        }

        info!(product_id = %product_id, "Product deleted");

        if let Err(e) = self.event_sender.send(Event::ProductDeleted(product_id)).await {
            warn!(error = %e, product_id = %product_id, "Failed to send product deleted event");
        }

        Ok(())
    }

    async fn with_category(
        &self,
        product_model: product::Model,
    ) -> Result<ProductResponse, ServiceError> {
        let db = &*self.db;

        let category_model = CategoryEntity::find_by_id(product_model.category_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(to_response(product_model, category_model))
    }
}

fn to_response(
    product_model: product::Model,
    category_model: Option<category::Model>,
) -> ProductResponse {
    ProductResponse {
        id: product_model.id,
        model: product_model.model,
        description: product_model.description,
        category: category_model.map(|c| CategoryInfo {
            id: c.id,
            name: c.name,
        }),
        price: product_model.price,
        price_distribution: product_model.price_distribution,
        stock: product_model.stock,
        min_stock: product_model.min_stock,
        image_url: product_model.image_url,
        last_updated: product_model.last_updated,
    }
}
