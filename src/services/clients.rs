use crate::{
    db::DbPool,
    entities::client::{self, Entity as ClientEntity},
    entities::client_phone::{self, Entity as ClientPhoneEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Minimum normalized similarity for a fuzzy business-name match.
const SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePhoneRequest {
    #[validate(length(min = 1, max = 20, message = "Phone number is required"))]
    pub number: String,
    pub label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Business name is required"))]
    pub business_name: String,
    pub tax_id: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub legal_address: Option<String>,
    #[serde(default)]
    #[validate]
    pub phones: Vec<CreatePhoneRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Business name cannot be empty"))]
    pub business_name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub legal_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhoneResponse {
    pub id: Uuid,
    pub number: String,
    pub label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub business_name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub legal_address: Option<String>,
    pub registration_date: DateTime<Utc>,
    pub phones: Vec<PhoneResponse>,
}

/// Service for managing clients and resolving free-text client names
#[derive(Clone)]
pub struct ClientService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ClientService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Resolves a free-text client name to an existing client, or creates one.
    ///
    /// Runs on the caller's open transaction so a later failure in the
    /// enclosing load rolls back any client created here. Exact business-name
    /// matches win; otherwise every stored client is scored with a normalized
    /// Levenshtein similarity and the best candidate at or above the
    /// threshold is chosen. Candidates are scanned oldest-first and only a
    /// strictly better score replaces the current best, so equal scores
    /// resolve to the earliest-registered client.
    pub async fn resolve_client(
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<client::Model, ServiceError> {
        let exact = ClientEntity::find()
            .filter(client::Column::BusinessName.eq(name))
            .one(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if let Some(found) = exact {
            debug!(client_id = %found.id, name, "client resolved by exact match");
            return Ok(found);
        }

        let candidates = ClientEntity::find()
            .order_by_asc(client::Column::RegistrationDate)
            .order_by_asc(client::Column::Id)
            .all(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut best_match: Option<&client::Model> = None;
        let mut best_similarity = 0.0_f64;

        for candidate in &candidates {
            let similarity = name_similarity(name, &candidate.business_name);
            if similarity >= SIMILARITY_THRESHOLD && similarity > best_similarity {
                best_similarity = similarity;
                best_match = Some(candidate);
            }
        }

        if let Some(found) = best_match {
            debug!(
                client_id = %found.id,
                name,
                matched = %found.business_name,
                similarity = best_similarity,
                "client resolved by fuzzy match"
            );
            return Ok(found.clone());
        }

        let new_client = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            business_name: Set(name.to_string()),
            tax_id: Set(None),
            email: Set(None),
            legal_address: Set(None),
            registration_date: Set(Utc::now()),
        };

        let created = new_client
            .insert(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(client_id = %created.id, name, "created client for unmatched name");
        Ok(created)
    }

    /// Creates a client together with its contact phones in one transaction
    #[instrument(skip(self, request), fields(business_name = %request.business_name))]
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;
        let client_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for client creation");
            ServiceError::DatabaseError(e)
        })?;

        let client_model = client::ActiveModel {
            id: Set(client_id),
            business_name: Set(request.business_name.clone()),
            tax_id: Set(request.tax_id.clone()),
            email: Set(request.email.clone()),
            legal_address: Set(request.legal_address.clone()),
            registration_date: Set(Utc::now()),
        };

        let client_model = client_model
            .insert(&txn)
            .await
            .map_err(|e| ServiceError::from_db(e, "Tax id already registered"))?;

        let mut phones = Vec::with_capacity(request.phones.len());
        for phone in &request.phones {
            let phone_model = client_phone::ActiveModel {
                id: Set(Uuid::new_v4()),
                client_id: Set(client_id),
                number: Set(phone.number.clone()),
                label: Set(phone.label.clone()),
            };
            phones.push(
                phone_model
                    .insert(&txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?,
            );
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to commit client creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %client_id, "Client created successfully");

        if let Err(e) = self.event_sender.send(Event::ClientCreated(client_id)).await {
            warn!(error = %e, client_id = %client_id, "Failed to send client created event");
        }

        Ok(to_response(client_model, phones))
    }

    /// Retrieves a client with its phones
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(&self, client_id: Uuid) -> Result<ClientResponse, ServiceError> {
        let db = &*self.db;

        let client_model = ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client with id {} not found", client_id))
            })?;

        let phones = ClientPhoneEntity::find()
            .filter(client_phone::Column::ClientId.eq(client_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(to_response(client_model, phones))
    }

    /// Lists all clients with their phones
    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<ClientResponse>, ServiceError> {
        let db = &*self.db;

        let clients = ClientEntity::find()
            .find_with_related(ClientPhoneEntity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(clients
            .into_iter()
            .map(|(client_model, phones)| to_response(client_model, phones))
            .collect())
    }

    /// Updates client master data
    #[instrument(skip(self, request), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        let client_model = ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client with id {} not found", client_id))
            })?;

        let mut active: client::ActiveModel = client_model.into();
        if let Some(business_name) = request.business_name {
            active.business_name = Set(business_name);
        }
        if let Some(tax_id) = request.tax_id {
            active.tax_id = Set(Some(tax_id));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(legal_address) = request.legal_address {
            active.legal_address = Set(Some(legal_address));
        }

        let updated = active
            .update(db)
            .await
            .map_err(|e| ServiceError::from_db(e, "Tax id already registered"))?;

        if let Err(e) = self.event_sender.send(Event::ClientUpdated(client_id)).await {
            warn!(error = %e, client_id = %client_id, "Failed to send client updated event");
        }

        let phones = ClientPhoneEntity::find()
            .filter(client_phone::Column::ClientId.eq(client_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(to_response(updated, phones))
    }

    /// Deletes a client and its phones, children first
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn delete_client(&self, client_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        ClientPhoneEntity::delete_many()
            .filter(client_phone::Column::ClientId.eq(client_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let result = ClientEntity::delete_by_id(client_id)
            .exec(&txn)
            .await
            .map_err(|e| ServiceError::from_db(e, "Client is still referenced by loads"))?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Client with id {} not found",
                client_id
            )));
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(client_id = %client_id, "Client deleted");

        if let Err(e) = self.event_sender.send(Event::ClientDeleted(client_id)).await {
            warn!(error = %e, client_id = %client_id, "Failed to send client deleted event");
        }

        Ok(())
    }

    /// Adds a contact phone to an existing client
    #[instrument(skip(self, request), fields(client_id = %client_id))]
    pub async fn add_phone(
        &self,
        client_id: Uuid,
        request: CreatePhoneRequest,
    ) -> Result<PhoneResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client with id {} not found", client_id))
            })?;

        let phone_model = client_phone::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            number: Set(request.number),
            label: Set(request.label),
        };

        let created = phone_model
            .insert(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PhoneResponse {
            id: created.id,
            number: created.number,
            label: created.label,
        })
    }

    /// Removes a single contact phone
    #[instrument(skip(self), fields(phone_id = %phone_id))]
    pub async fn remove_phone(&self, phone_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = ClientPhoneEntity::delete_by_id(phone_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Phone record {} not found",
                phone_id
            )));
        }

        Ok(())
    }
}

fn to_response(client_model: client::Model, phones: Vec<client_phone::Model>) -> ClientResponse {
    ClientResponse {
        id: client_model.id,
        business_name: client_model.business_name,
        tax_id: client_model.tax_id,
        email: client_model.email,
        legal_address: client_model.legal_address,
        registration_date: client_model.registration_date,
        phones: phones
            .into_iter()
            .map(|p| PhoneResponse {
                id: p.id,
                number: p.number,
                label: p.label,
            })
            .collect(),
    }
}

/// Levenshtein edit distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution_cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + substitution_cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity: `1 - distance / max(len)`, in `[0, 1]`.
fn name_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}
