use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    entities::client::Entity as ClientEntity,
    entities::load::{self, Entity as LoadEntity, LoadType},
    entities::product::{self, Entity as ProductEntity},
    entities::sheet_load::{self, Entity as SheetLoadEntity},
    entities::transaction::{self, Entity as TransactionEntity, TransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{LineItem, Order, PurchaseRequest},
    services::clients::ClientService,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const MAX_FILE_NAME_LEN: usize = 255;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseLoadRequest {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,
    pub data: Vec<PurchaseRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSalesLoadRequest {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,
    pub data: Vec<Order>,
}

/// Outcome of a successfully committed load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub load_id: Uuid,
    pub file_name: String,
    pub load_type: LoadType,
    pub load_date: DateTime<Utc>,
    pub total_sheets: u64,
    pub total_transactions: u64,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadHistoryEntry {
    pub load_id: Uuid,
    pub file_name: String,
    pub load_type: LoadType,
    pub load_date: DateTime<Utc>,
}

/// Reconstructed content of a persisted load, shaped like the extractor
/// records it was ingested from.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadData {
    Orders(Vec<Order>),
    PurchaseRequests(Vec<PurchaseRequest>),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadDataResponse {
    pub file_type: String,
    pub data: LoadData,
}

/// One normalized sheet of a load, regardless of direction.
struct SheetEntry {
    id: Uuid,
    sheet_name: String,
    date: DateTime<Utc>,
    client_name: Option<String>,
    items: Vec<LineItem>,
}

/// Service applying batches of stock-affecting transactions atomically
#[derive(Clone)]
pub struct LoadService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl LoadService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Ingests a purchase load: every line item increases product stock.
    #[instrument(skip(self, request), fields(file_name = %request.file_name))]
    pub async fn process_purchase_load(
        &self,
        request: CreatePurchaseLoadRequest,
    ) -> Result<LoadSummary, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_batch(&request.file_name, request.data.len())?;

        let entries: Vec<SheetEntry> = request
            .data
            .into_iter()
            .map(|purchase| SheetEntry {
                id: purchase.id,
                sheet_name: purchase.sheet_name,
                date: purchase.request_date,
                client_name: None,
                items: purchase.products,
            })
            .collect();
        validate_entries(&entries)?;

        self.process_load(&request.file_name, LoadType::Purchase, entries)
            .await
    }

    /// Ingests a sales load: client names are resolved per sheet and every
    /// line item decreases product stock.
    #[instrument(skip(self, request), fields(file_name = %request.file_name))]
    pub async fn process_sales_load(
        &self,
        request: CreateSalesLoadRequest,
    ) -> Result<LoadSummary, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_batch(&request.file_name, request.data.len())?;

        for order in &request.data {
            if order.client_name.trim().is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "Sheet '{}' has no client name",
                    order.sheet_name
                )));
            }
        }

        let entries: Vec<SheetEntry> = request
            .data
            .into_iter()
            .map(|order| SheetEntry {
                id: order.id,
                sheet_name: order.sheet_name,
                date: order.order_date,
                client_name: Some(order.client_name),
                items: order.products,
            })
            .collect();
        validate_entries(&entries)?;

        self.process_load(&request.file_name, LoadType::Sale, entries)
            .await
    }

    /// Applies a whole load as one atomic unit: load header, sheets, stock
    /// mutations and the transaction ledger either all commit or none do.
    async fn process_load(
        &self,
        file_name: &str,
        load_type: LoadType,
        entries: Vec<SheetEntry>,
    ) -> Result<LoadSummary, ServiceError> {
        let db = &*self.db;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, file_name, "Failed to start transaction for load processing");
            ServiceError::DatabaseError(e)
        })?;

        match Self::apply_entries(&txn, file_name, load_type, entries).await {
            Ok(summary) => {
                txn.commit().await.map_err(|e| {
                    error!(error = %e, file_name, "Failed to commit load processing transaction");
                    ServiceError::DatabaseError(e)
                })?;

                info!(
                    load_id = %summary.load_id,
                    file_name,
                    load_type = load_type.as_str(),
                    total_sheets = summary.total_sheets,
                    total_transactions = summary.total_transactions,
                    "Load processed successfully"
                );

                if let Err(e) = self
                    .event_sender
                    .send(Event::LoadProcessed {
                        load_id: summary.load_id,
                        load_type,
                        total_sheets: summary.total_sheets,
                        total_transactions: summary.total_transactions,
                    })
                    .await
                {
                    warn!(error = %e, load_id = %summary.load_id, "Failed to send load processed event");
                }

                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, file_name, "Load processing failed; rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, file_name, "Rollback failed after load processing error");
                }
                Err(e)
            }
        }
    }

    async fn apply_entries(
        txn: &DatabaseTransaction,
        file_name: &str,
        load_type: LoadType,
        entries: Vec<SheetEntry>,
    ) -> Result<LoadSummary, ServiceError> {
        let now = Utc::now();

        let load_model = load::ActiveModel {
            id: Set(Uuid::new_v4()),
            file_name: Set(file_name.to_string()),
            load_type: Set(load_type),
            load_date: Set(now),
        };

        let load_model = load_model.insert(txn).await.map_err(|e| {
            ServiceError::from_db(e, &format!("A load for file '{}' already exists", file_name))
        })?;

        let mut total_sheets = 0u64;
        let mut total_transactions = 0u64;

        for entry in entries {
            total_sheets += 1;

            let client_id = match &entry.client_name {
                Some(name) => Some(ClientService::resolve_client(txn, name).await?.id),
                None => None,
            };

            let sheet_model = sheet_load::ActiveModel {
                id: Set(entry.id),
                load_id: Set(load_model.id),
                sheet_name: Set(entry.sheet_name.clone()),
                client_id: Set(client_id),
                processed_date: Set(now),
            };
            sheet_model
                .insert(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            let product_ids: Vec<Uuid> = entry.items.iter().map(|item| item.id).collect();
            let mut products = ProductEntity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            let mut transactions = Vec::with_capacity(entry.items.len());

            for item in &entry.items {
                total_transactions += 1;

                let product_model = products
                    .iter_mut()
                    .find(|p| p.id == item.id)
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Product with id {} not found", item.id))
                    })?;

                let new_stock = match load_type {
                    LoadType::Purchase => product_model.stock + item.quantity,
                    LoadType::Sale => {
                        if product_model.stock < item.quantity {
                            return Err(ServiceError::InsufficientStock(format!(
                                "product {}: available {}, requested {}",
                                product_model.model, product_model.stock, item.quantity
                            )));
                        }
                        product_model.stock - item.quantity
                    }
                };

                // Persist immediately and keep the fetched copy current, so a
                // later item referencing the same product sees the running
                // stock within this load.
                let mut active: product::ActiveModel = product_model.clone().into();
                active.stock = Set(new_stock);
                *product_model = active
                    .update(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                transactions.push(transaction::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(item.id),
                    r#type: Set(match load_type {
                        LoadType::Purchase => TransactionType::In,
                        LoadType::Sale => TransactionType::Out,
                    }),
                    quantity: Set(item.quantity),
                    unit_price: Set(item.price),
                    transaction_date: Set(entry.date),
                    sheet_load_id: Set(entry.id),
                });
            }

            if !transactions.is_empty() {
                TransactionEntity::insert_many(transactions)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
            }

            debug!(
                sheet_id = %entry.id,
                sheet_name = %entry.sheet_name,
                "sheet applied"
            );
        }

        Ok(LoadSummary {
            load_id: load_model.id,
            file_name: load_model.file_name,
            load_type,
            load_date: load_model.load_date,
            total_sheets,
            total_transactions,
            success: true,
        })
    }

    /// Reconstructs the extractor-shaped records of a persisted load.
    #[instrument(skip(self), fields(load_id = %load_id))]
    pub async fn get_load_data(&self, load_id: Uuid) -> Result<LoadDataResponse, ServiceError> {
        let db = &*self.db;

        let load_model = LoadEntity::find_by_id(load_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Load with id {} not found", load_id)))?;

        let sheets = SheetLoadEntity::find()
            .filter(sheet_load::Column::LoadId.eq(load_id))
            .order_by_asc(sheet_load::Column::ProcessedDate)
            .order_by_asc(sheet_load::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut orders = Vec::new();
        let mut purchases = Vec::new();

        for sheet in &sheets {
            let transactions = TransactionEntity::find()
                .filter(transaction::Column::SheetLoadId.eq(sheet.id))
                .order_by_asc(transaction::Column::Id)
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;

            let product_ids: Vec<Uuid> = transactions.iter().map(|t| t.product_id).collect();
            let products: HashMap<Uuid, (product::Model, Option<category::Model>)> =
                ProductEntity::find()
                    .find_also_related(CategoryEntity)
                    .filter(product::Column::Id.is_in(product_ids))
                    .all(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .into_iter()
                    .map(|(p, c)| (p.id, (p, c)))
                    .collect();

            let mut items = Vec::with_capacity(transactions.len());
            let mut sheet_total = Decimal::ZERO;

            for tx in &transactions {
                let (product_model, category_model) =
                    products.get(&tx.product_id).ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "Product {} referenced by transaction {} is missing",
                            tx.product_id, tx.id
                        ))
                    })?;

                let line_total = tx.unit_price * Decimal::from(tx.quantity);
                sheet_total += line_total;

                items.push(LineItem {
                    id: product_model.id,
                    model: product_model.model.clone(),
                    description: product_model.description.clone(),
                    price: tx.unit_price,
                    quantity: tx.quantity,
                    total: line_total,
                    image_url: product_model.image_url.clone(),
                    category: Some(
                        category_model
                            .as_ref()
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| "Uncategorized".to_string()),
                    ),
                });
            }

            let sheet_date = transactions
                .first()
                .map(|t| t.transaction_date)
                .unwrap_or(sheet.processed_date);

            match load_model.load_type {
                LoadType::Purchase => purchases.push(PurchaseRequest {
                    id: sheet.id,
                    request_date: sheet_date,
                    products: items,
                    total_cost: sheet_total,
                    sheet_name: sheet.sheet_name.clone(),
                }),
                LoadType::Sale => {
                    let client_name = match sheet.client_id {
                        Some(client_id) => ClientEntity::find_by_id(client_id)
                            .one(db)
                            .await
                            .map_err(ServiceError::DatabaseError)?
                            .map(|c| c.business_name),
                        None => None,
                    };

                    orders.push(Order {
                        id: sheet.id,
                        client_name: client_name
                            .unwrap_or_else(|| "Unspecified client".to_string()),
                        order_date: sheet_date,
                        products: items,
                        total: sheet_total,
                        sheet_name: sheet.sheet_name.clone(),
                    });
                }
            }
        }

        let response = match load_model.load_type {
            LoadType::Purchase => LoadDataResponse {
                file_type: "purchase_request".to_string(),
                data: LoadData::PurchaseRequests(purchases),
            },
            LoadType::Sale => LoadDataResponse {
                file_type: "order".to_string(),
                data: LoadData::Orders(orders),
            },
        };

        Ok(response)
    }

    /// Lists all persisted loads, newest first
    #[instrument(skip(self))]
    pub async fn get_loads_history(&self) -> Result<Vec<LoadHistoryEntry>, ServiceError> {
        let db = &*self.db;

        let loads = LoadEntity::find()
            .order_by_desc(load::Column::LoadDate)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(loads
            .into_iter()
            .map(|l| LoadHistoryEntry {
                load_id: l.id,
                file_name: l.file_name,
                load_type: l.load_type,
                load_date: l.load_date,
            })
            .collect())
    }
}

fn validate_batch(file_name: &str, sheet_count: usize) -> Result<(), ServiceError> {
    if file_name.trim().is_empty() || file_name.len() > MAX_FILE_NAME_LEN {
        return Err(ServiceError::ValidationError(
            "File name must be between 1 and 255 characters".to_string(),
        ));
    }
    if sheet_count == 0 {
        return Err(ServiceError::ValidationError(
            "Load contains no sheets".to_string(),
        ));
    }
    Ok(())
}

/// Rejects malformed line items before any transaction starts.
fn validate_entries(entries: &[SheetEntry]) -> Result<(), ServiceError> {
    for entry in entries {
        if entry.sheet_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Sheet {} has no name",
                entry.id
            )));
        }
        for item in &entry.items {
            if item.quantity <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Sheet '{}': quantity for product {} must be strictly positive (got {})",
                    entry.sheet_name, item.model, item.quantity
                )));
            }
            if item.price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Sheet '{}': unit price for product {} must be strictly positive (got {})",
                    entry.sheet_name, item.model, item.price
                )));
            }
        }
    }
    Ok(())
}
