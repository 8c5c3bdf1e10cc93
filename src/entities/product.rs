use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Product entity
///
/// `stock` is mutated exclusively by load processing (increment on purchase,
/// decrement on sale) and load reversal (inverse delta); it must never be
/// negative after a committed operation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique product model code (e.g., "PRD-110")
    #[validate(length(
        min = 1,
        max = 100,
        message = "Product model must be between 1 and 100 characters"
    ))]
    pub model: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    pub category_id: Uuid,

    /// Unit price
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,

    /// Distribution price used for wholesale calculations
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_distribution: Decimal,

    /// Current available stock
    pub stock: i32,

    /// Minimum stock threshold for low-stock alerts
    pub min_stock: i32,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        active_model.last_updated = Set(Utc::now());

        if let ActiveValue::Set(stock) | ActiveValue::Unchanged(stock) = active_model.stock {
            if stock < 0 {
                return Err(DbErr::Custom(format!(
                    "Product stock cannot be negative (got {})",
                    stock
                )));
            }
        }

        let model: Model = active_model.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(active_model)
    }
}
