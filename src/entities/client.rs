use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Client (business customer) entity
///
/// Business names are fuzzy-matchable during load ingestion and should be
/// near-unique in practice, but uniqueness is not enforced. The tax id is
/// unique where present.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Business name must be between 1 and 100 characters"
    ))]
    pub business_name: String,

    #[sea_orm(nullable)]
    pub tax_id: Option<String>,

    #[sea_orm(nullable)]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub legal_address: Option<String>,

    pub registration_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_phone::Entity")]
    Phones,
    #[sea_orm(has_many = "super::sheet_load::Entity")]
    SheetLoads,
}

impl Related<super::client_phone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phones.def()
    }
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
            if let ActiveValue::NotSet = active_model.registration_date {
                active_model.registration_date = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
