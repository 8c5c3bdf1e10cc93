use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum TransactionType {
    /// Stock entered the inventory (purchase)
    #[sea_orm(string_value = "IN")]
    In,
    /// Stock left the inventory (sale)
    #[sea_orm(string_value = "OUT")]
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }
}

/// Ledger entry recording a single stock movement caused by a load.
///
/// Immutable once created; removed only when its load is reverted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    pub r#type: TransactionType,

    /// Units moved, strictly positive
    pub quantity: i32,

    /// Price per unit at movement time, strictly positive
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,

    pub transaction_date: DateTime<Utc>,

    pub sheet_load_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::sheet_load::Entity",
        from = "Column::SheetLoadId",
        to = "super::sheet_load::Column::Id"
    )]
    SheetLoad,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::sheet_load::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SheetLoad.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let active_model = self;

        if let sea_orm::ActiveValue::Set(quantity) = active_model.quantity {
            if quantity <= 0 {
                return Err(DbErr::Custom(format!(
                    "Transaction quantity must be strictly positive (got {})",
                    quantity
                )));
            }
        }

        if let sea_orm::ActiveValue::Set(unit_price) = active_model.unit_price {
            if unit_price <= Decimal::ZERO {
                return Err(DbErr::Custom(format!(
                    "Transaction unit price must be strictly positive (got {})",
                    unit_price
                )));
            }
        }

        Ok(active_model)
    }
}
