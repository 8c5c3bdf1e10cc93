use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, SqlErr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Service for category master data
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;
        let category_id = Uuid::new_v4();

        let active = category::ActiveModel {
            id: Set(category_id),
            name: Set(request.name),
            description: Set(request.description),
            created_at: Set(Utc::now()),
        };

        let created = active
            .insert(db)
            .await
            .map_err(|e| ServiceError::from_db(e, "Category name already exists"))?;

        info!(category_id = %category_id, name = %created.name, "Category created");

        if let Err(e) = self
            .event_sender
            .send(Event::CategoryCreated(category_id))
            .await
        {
            warn!(error = %e, category_id = %category_id, "Failed to send category created event");
        }

        Ok(to_response(created))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let db = &*self.db;

        let categories = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(categories.into_iter().map(to_response).collect())
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryResponse, ServiceError> {
        let db = &*self.db;

        let found = CategoryEntity::find_by_id(category_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category with id {} not found", category_id))
            })?;

        Ok(to_response(found))
    }

    #[instrument(skip(self, request), fields(category_id = %category_id))]
    pub async fn update_category(
        &self,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        let found = CategoryEntity::find_by_id(category_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category with id {} not found", category_id))
            })?;

        let mut active: category::ActiveModel = found.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_db(e, "Category name already exists"))?;

        if let Err(e) = self
            .event_sender
            .send(Event::CategoryUpdated(category_id))
            .await
        {
            warn!(error = %e, category_id = %category_id, "Failed to send category updated event");
        }

        Ok(to_response(updated))
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = CategoryEntity::delete_by_id(category_id)
            .exec(db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    ServiceError::Conflict("Category is still referenced by products".to_string())
                }
                _ => ServiceError::DatabaseError(e),
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Category with id {} not found",
                category_id
            )));
        }

        info!(category_id = %category_id, "Category deleted");

        if let Err(e) = self
            .event_sender
            .send(Event::CategoryDeleted(category_id))
            .await
        {
            warn!(error = %e, category_id = %category_id, "Failed to send category deleted event");
        }

        Ok(())
    }
}

fn to_response(model: category::Model) -> CategoryResponse {
    CategoryResponse {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
    }
}
