pub mod categories;
pub mod clients;
pub mod health;
pub mod loads;
pub mod metrics;
pub mod products;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub loads: Arc<crate::services::loads::LoadService>,
    pub load_revert: Arc<crate::services::load_revert::LoadRevertService>,
    pub clients: Arc<crate::services::clients::ClientService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub categories: Arc<crate::services::categories::CategoryService>,
    pub metrics: Arc<crate::services::metrics::MetricsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            loads: Arc::new(crate::services::loads::LoadService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            load_revert: Arc::new(crate::services::load_revert::LoadRevertService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            clients: Arc::new(crate::services::clients::ClientService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            categories: Arc::new(crate::services::categories::CategoryService::new(
                db_pool.clone(),
                event_sender,
            )),
            metrics: Arc::new(crate::services::metrics::MetricsService::new(db_pool)),
        }
    }
}
