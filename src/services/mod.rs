// Core services
pub mod load_revert;
pub mod loads;

// Master data and reporting
pub mod categories;
pub mod clients;
pub mod metrics;
pub mod products;
