use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logical unit of an ingested upload (one spreadsheet tab).
///
/// The primary key is the sheet id assigned by the record extractor, not a
/// fresh uuid, so a persisted load can be reconstructed in its original
/// shape. The client reference is present only for sales.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sheet_loads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub load_id: Uuid,

    pub sheet_name: String,

    #[sea_orm(nullable)]
    pub client_id: Option<Uuid>,

    pub processed_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::load::Entity",
        from = "Column::LoadId",
        to = "super::load::Column::Id"
    )]
    Load,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::load::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Load.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
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
            if let ActiveValue::NotSet = active_model.processed_date {
                active_model.processed_date = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
