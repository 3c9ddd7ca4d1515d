//! 索引与TTL对齐

pub mod catalog;
pub mod reconciler;

pub use catalog::{index_catalog, CollectionIndexes};
pub use reconciler::{CollectionReport, IndexReconciler, ReconcileOutcome, ReconcileReport};
