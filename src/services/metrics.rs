use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    entities::transaction::{self, Entity as TransactionEntity, TransactionType},
    errors::ServiceError,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

const TOP_PRODUCTS_LIMIT: u64 = 5;
const TREND_MONTHS: u32 = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_stock: i64,
    pub total_value: Decimal,
    pub low_stock_count: i64,
    pub last_month_sold: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductUnits {
    pub model: String,
    pub units: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyUnits {
    /// Calendar month in `YYYY-MM` form
    pub month: String,
    pub units: i64,
}

/// Aggregate dashboard read over products and the transaction ledger.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub summary: SummaryMetrics,
    pub top_products: Vec<ProductUnits>,
    pub stock_distribution: Vec<ProductUnits>,
    pub monthly_trend: Vec<MonthlyUnits>,
}

#[derive(FromQueryResult)]
struct SumRow {
    total: Option<i64>,
}

#[derive(FromQueryResult)]
struct TopProductRow {
    model: String,
    units: Option<i64>,
}

/// Read-only reporting service for the dashboard
#[derive(Clone)]
pub struct MetricsService {
    db: Arc<DbPool>,
}

impl MetricsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_dashboard_metrics(&self) -> Result<DashboardMetrics, ServiceError> {
        let now = Utc::now();

        let products = ProductEntity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let total_stock: i64 = products.iter().map(|p| i64::from(p.stock)).sum();
        let total_value: Decimal = products
            .iter()
            .map(|p| p.price * Decimal::from(p.stock))
            .sum();
        let low_stock_count = products
            .iter()
            .filter(|p| p.stock > 0 && p.stock < p.min_stock)
            .count() as i64;

        let last_month_sold = self.last_month_sold(now).await?;
        let top_products = self.top_products().await?;

        let mut stock_distribution: Vec<ProductUnits> = products
            .iter()
            .filter(|p| p.stock > 0)
            .map(|p| ProductUnits {
                model: p.model.clone(),
                units: i64::from(p.stock),
            })
            .collect();
        stock_distribution.sort_by(|a, b| b.units.cmp(&a.units));

        let monthly_trend = self.monthly_trend(now).await?;

        Ok(DashboardMetrics {
            summary: SummaryMetrics {
                total_stock,
                total_value,
                low_stock_count,
                last_month_sold,
            },
            top_products,
            stock_distribution,
            monthly_trend,
        })
    }

    /// Units sold in the previous calendar month
    async fn last_month_sold(&self, now: DateTime<Utc>) -> Result<i64, ServiceError> {
        let this_month = month_start(now.year(), now.month());
        let last_month = shift_month(now.year(), now.month(), -1);
        let last_month_start = month_start(last_month.0, last_month.1);

        let row = TransactionEntity::find()
            .select_only()
            .column_as(transaction::Column::Quantity.sum(), "total")
            .filter(transaction::Column::Type.eq(TransactionType::Out))
            .filter(transaction::Column::TransactionDate.gte(last_month_start))
            .filter(transaction::Column::TransactionDate.lt(this_month))
            .into_model::<SumRow>()
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }

    /// Top models by units sold, all time
    async fn top_products(&self) -> Result<Vec<ProductUnits>, ServiceError> {
        let rows = TransactionEntity::find()
            .select_only()
            .column_as(product::Column::Model, "model")
            .column_as(transaction::Column::Quantity.sum(), "units")
            .join(JoinType::InnerJoin, transaction::Relation::Product.def())
            .filter(transaction::Column::Type.eq(TransactionType::Out))
            .group_by(product::Column::Model)
            .order_by_desc(transaction::Column::Quantity.sum())
            .limit(TOP_PRODUCTS_LIMIT)
            .into_model::<TopProductRow>()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|r| ProductUnits {
                model: r.model,
                units: r.units.unwrap_or(0),
            })
            .collect())
    }

    /// Units sold per calendar month over the trailing window, zero-filled
    async fn monthly_trend(&self, now: DateTime<Utc>) -> Result<Vec<MonthlyUnits>, ServiceError> {
        let window_start_ym = shift_month(now.year(), now.month(), -(TREND_MONTHS as i32 - 1));
        let window_start = month_start(window_start_ym.0, window_start_ym.1);

        let sold = TransactionEntity::find()
            .filter(transaction::Column::Type.eq(TransactionType::Out))
            .filter(transaction::Column::TransactionDate.gte(window_start))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut buckets: BTreeMap<(i32, u32), i64> = BTreeMap::new();
        for tx in &sold {
            let key = (tx.transaction_date.year(), tx.transaction_date.month());
            *buckets.entry(key).or_insert(0) += i64::from(tx.quantity);
        }

        let mut trend = Vec::with_capacity(TREND_MONTHS as usize);
        for offset in (0..TREND_MONTHS as i32).rev() {
            let (year, month) = shift_month(now.year(), now.month(), -offset);
            trend.push(MonthlyUnits {
                month: format!("{:04}-{:02}", year, month),
                units: buckets.get(&(year, month)).copied().unwrap_or(0),
            });
        }

        Ok(trend)
    }
}

/// First instant of a calendar month, UTC
fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first day of month is always a valid timestamp")
}

/// Shifts a (year, month) pair by a signed number of months
fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 8, -1, (2026, 7))]
    #[case(2026, 1, -1, (2025, 12))]
    #[case(2026, 1, -5, (2025, 8))]
    #[case(2025, 12, 1, (2026, 1))]
    #[case(2026, 8, 0, (2026, 8))]
    fn shift_month_handles_year_boundaries(
        #[case] year: i32,
        #[case] month: u32,
        #[case] delta: i32,
        #[case] expected: (i32, u32),
    ) {
        assert_eq!(shift_month(year, month, delta), expected);
    }

    #[test]
    fn month_start_is_midnight_on_the_first() {
        let start = month_start(2026, 2);
        assert_eq!(start.to_rfc3339(), "2026-02-01T00:00:00+00:00");
    }
}
