use crate::{
    db::DbPool,
    entities::load::Entity as LoadEntity,
    entities::product::{self, Entity as ProductEntity},
    entities::sheet_load::{self, Entity as SheetLoadEntity},
    entities::transaction::{self, Entity as TransactionEntity, TransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Outcome of a successfully committed reversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertSummary {
    pub success: bool,
    pub message: String,
    pub load_id: Uuid,
    pub reverted_sheets: u64,
    pub reverted_transactions: u64,
}

/// Service undoing a previously applied load: inverse stock deltas plus
/// destruction of the load graph, all in one transaction.
#[derive(Clone)]
pub struct LoadRevertService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl LoadRevertService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Reverts a load.
    ///
    /// Net per-product deltas are computed and verified against current stock
    /// before any write happens, so a reversal that would drive any product
    /// negative leaves the database completely untouched.
    #[instrument(skip(self), fields(load_id = %load_id))]
    pub async fn revert_load(&self, load_id: Uuid) -> Result<RevertSummary, ServiceError> {
        let db = &*self.db;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, load_id = %load_id, "Failed to start transaction for load reversal");
            ServiceError::DatabaseError(e)
        })?;

        match Self::revert_within(&txn, load_id).await {
            Ok(summary) => {
                txn.commit().await.map_err(|e| {
                    error!(error = %e, load_id = %load_id, "Failed to commit load reversal transaction");
                    ServiceError::DatabaseError(e)
                })?;

                info!(
                    load_id = %load_id,
                    reverted_sheets = summary.reverted_sheets,
                    reverted_transactions = summary.reverted_transactions,
                    "Load reverted successfully"
                );

                if let Err(e) = self
                    .event_sender
                    .send(Event::LoadReverted {
                        load_id,
                        reverted_sheets: summary.reverted_sheets,
                        reverted_transactions: summary.reverted_transactions,
                    })
                    .await
                {
                    warn!(error = %e, load_id = %load_id, "Failed to send load reverted event");
                }

                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, load_id = %load_id, "Load reversal failed; rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, load_id = %load_id, "Rollback failed after reversal error");
                }
                Err(e)
            }
        }
    }

    async fn revert_within(
        txn: &DatabaseTransaction,
        load_id: Uuid,
    ) -> Result<RevertSummary, ServiceError> {
        // Load the full graph: load -> sheets -> transactions -> products.
        let load_model = LoadEntity::find_by_id(load_id)
            .one(txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Load with id {} not found", load_id)))?;

        let sheets = SheetLoadEntity::find()
            .filter(sheet_load::Column::LoadId.eq(load_id))
            .order_by_asc(sheet_load::Column::Id)
            .all(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut sheet_transactions: Vec<(sheet_load::Model, Vec<transaction::Model>)> =
            Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let transactions = TransactionEntity::find()
                .filter(transaction::Column::SheetLoadId.eq(sheet.id))
                .all(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            sheet_transactions.push((sheet, transactions));
        }

        debug!(
            load_id = %load_id,
            file_name = %load_model.file_name,
            sheets = sheet_transactions.len(),
            phase = "compute",
            "computing net stock deltas"
        );

        // Compute phase: net signed delta per product, no writes. Undoing an
        // IN subtracts its quantity; undoing an OUT adds it back.
        let mut deltas: BTreeMap<Uuid, i64> = BTreeMap::new();
        for (_, transactions) in &sheet_transactions {
            for tx in transactions {
                let delta = match tx.r#type {
                    TransactionType::In => -i64::from(tx.quantity),
                    TransactionType::Out => i64::from(tx.quantity),
                };
                *deltas.entry(tx.product_id).or_insert(0) += delta;
            }
        }

        let product_ids: Vec<Uuid> = deltas.keys().copied().collect();
        let products: BTreeMap<Uuid, product::Model> = ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        debug!(
            load_id = %load_id,
            products = deltas.len(),
            phase = "verify",
            "verifying final stock levels"
        );

        // Verification phase: every product must stay non-negative once the
        // delta lands, otherwise abort before mutating anything.
        for (product_id, delta) in &deltas {
            let product_model = products.get(product_id).ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Product {} referenced by load {} is missing",
                    product_id, load_id
                ))
            })?;

            let final_stock = i64::from(product_model.stock) + delta;
            if final_stock < 0 {
                return Err(ServiceError::NegativeStockViolation(format!(
                    "product {}: stock {} with reversal delta {} would become {}",
                    product_model.model, product_model.stock, delta, final_stock
                )));
            }
        }

        debug!(load_id = %load_id, phase = "apply", "applying stock deltas");

        // Apply phase: re-read each product fresh, write the new stock and
        // read it back; a mismatch means the store is not behaving and the
        // whole reversal must abort.
        for (product_id, delta) in &deltas {
            let fresh = ProductEntity::find_by_id(*product_id)
                .one(txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Product {} disappeared while applying reversal",
                        product_id
                    ))
                })?;

            let expected = i64::from(fresh.stock) + delta;
            let new_stock = i32::try_from(expected).map_err(|_| {
                ServiceError::InternalError(format!(
                    "Stock for product {} out of range after reversal ({})",
                    fresh.model, expected
                ))
            })?;

            debug!(
                product = %fresh.model,
                stock_before = fresh.stock,
                delta,
                stock_after = new_stock,
                "updating product stock"
            );

            let model = fresh.model.clone();
            let mut active: product::ActiveModel = fresh.into();
            active.stock = Set(new_stock);
            active
                .update(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            let readback = ProductEntity::find_by_id(*product_id)
                .one(txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::VerificationFailed(format!(
                        "Product {} missing on readback",
                        product_id
                    ))
                })?;

            if readback.stock != new_stock {
                return Err(ServiceError::VerificationFailed(format!(
                    "product {}: expected stock {}, got {}",
                    model, new_stock, readback.stock
                )));
            }
        }

        debug!(load_id = %load_id, phase = "delete", "deleting load graph");

        // Delete phase: children before parents, verifying affected row
        // counts against the loaded graph at every step.
        let mut reverted_sheets = 0u64;
        let mut reverted_transactions = 0u64;

        for (sheet, transactions) in &sheet_transactions {
            let expected = transactions.len() as u64;

            let result = TransactionEntity::delete_many()
                .filter(transaction::Column::SheetLoadId.eq(sheet.id))
                .exec(txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected != expected {
                return Err(ServiceError::InconsistentDelete(format!(
                    "sheet {}: expected {} transactions deleted, got {}",
                    sheet.id, expected, result.rows_affected
                )));
            }

            reverted_transactions += expected;
            reverted_sheets += 1;
        }

        let result = SheetLoadEntity::delete_many()
            .filter(sheet_load::Column::LoadId.eq(load_id))
            .exec(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected != reverted_sheets {
            return Err(ServiceError::InconsistentDelete(format!(
                "load {}: expected {} sheets deleted, got {}",
                load_id, reverted_sheets, result.rows_affected
            )));
        }

        let result = LoadEntity::delete_by_id(load_id)
            .exec(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected != 1 {
            return Err(ServiceError::InconsistentDelete(format!(
                "load {}: expected 1 row deleted, got {}",
                load_id, result.rows_affected
            )));
        }

        Ok(RevertSummary {
            success: true,
            message: format!(
                "Load reverted successfully - {} sheets and {} transactions",
                reverted_sheets, reverted_transactions
            ),
            load_id,
            reverted_sheets,
            reverted_transactions,
        })
    }
}
