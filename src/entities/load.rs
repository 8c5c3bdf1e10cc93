use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a load: purchases increase stock, sales decrease it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum LoadType {
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "SALE")]
    Sale,
}

impl LoadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadType::Purchase => "PURCHASE",
            LoadType::Sale => "SALE",
        }
    }
}

/// Root of an ingested batch. Owns its sheet loads, which in turn own the
/// stock transactions; the whole graph is created and destroyed atomically.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Source file name, unique per ingested upload
    pub file_name: String,

    pub load_type: LoadType,

    pub load_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sheet_load::Entity")]
    SheetLoads,
}

impl Related<super::sheet_load::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SheetLoads.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.load_date {
                active_model.load_date = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
