pub mod app_config;
pub mod database;
pub mod node_reconcile;
pub mod observability;

// Re-export main types for easier imports
pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use node_reconcile::{NodeConfig, ReconcileConfig};
pub use observability::ObservabilityConfig;
