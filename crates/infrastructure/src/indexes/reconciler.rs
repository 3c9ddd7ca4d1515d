use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, info, info_span, Instrument};

use crawl_core::{SchedulerError, SchedulerResult};
use crawl_domain::{
    index::{diff_indexes, IndexSpec},
    ports::IndexStore,
};

use super::catalog::CollectionIndexes;

/// 单个集合的对齐结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Unchanged,
    Rebuilt { created: usize },
}

/// 一个集合在整轮对齐中的结果
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub collection: String,
    pub result: Result<ReconcileOutcome, SchedulerError>,
}

/// 一轮全量对齐的汇总
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub collections: Vec<CollectionReport>,
}

impl ReconcileReport {
    pub fn rebuilt(&self) -> Vec<&str> {
        self.collections
            .iter()
            .filter(|r| matches!(r.result, Ok(ReconcileOutcome::Rebuilt { .. })))
            .map(|r| r.collection.as_str())
            .collect()
    }

    pub fn unchanged(&self) -> Vec<&str> {
        self.collections
            .iter()
            .filter(|r| matches!(r.result, Ok(ReconcileOutcome::Unchanged)))
            .map(|r| r.collection.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &SchedulerError)> {
        self.collections
            .iter()
            .filter_map(|r| match &r.result {
                Err(e) => Some((r.collection.as_str(), e)),
                Ok(_) => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.collections.iter().all(|r| r.result.is_ok())
    }
}

/// 索引对齐器
///
/// 键模式签名出现缺失时删除全部非主键索引并一次性重建期望索引，
/// 否则不做任何修改。每次进程启动都会执行，稳定状态下必须是空操作。
pub struct IndexReconciler {
    store: Arc<dyn IndexStore>,
}

impl IndexReconciler {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self { store }
    }

    pub async fn reconcile(
        &self,
        collection: &str,
        desired: &[IndexSpec],
    ) -> SchedulerResult<ReconcileOutcome> {
        let existing = self.store.list_indexes(collection).await?;
        let diff = diff_indexes(&existing, desired);

        if !diff.needs_rebuild() {
            debug!("集合 {} 索引已对齐", collection);
            return Ok(ReconcileOutcome::Unchanged);
        }

        info!(
            "集合 {} 缺失索引 {:?}，开始重建（多余索引 {:?}）",
            collection, diff.missing, diff.unexpected
        );

        let to_create: Vec<IndexSpec> = desired
            .iter()
            .filter(|index| !index.is_primary())
            .cloned()
            .collect();

        self.store.drop_indexes_except_primary(collection).await?;
        self.store.create_indexes(collection, &to_create).await?;

        counter!("crawl_index_rebuilds_total").increment(1);
        info!("集合 {} 索引重建完成，共 {} 个", collection, to_create.len());
        Ok(ReconcileOutcome::Rebuilt {
            created: to_create.len(),
        })
    }

    /// 按声明顺序逐个对齐，单个集合失败只记录日志并继续
    pub async fn reconcile_all(&self, catalog: &[CollectionIndexes]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for entry in catalog {
            let span = info_span!("reconcile_indexes", collection = entry.collection);
            let result = self
                .reconcile(entry.collection, &entry.indexes)
                .instrument(span)
                .await;

            if let Err(e) = &result {
                counter!("crawl_index_reconcile_failures_total").increment(1);
                error!("集合 {} 索引对齐失败，跳过: {}", entry.collection, e);
            }

            report.collections.push(CollectionReport {
                collection: entry.collection.to_string(),
                result,
            });
        }

        info!(
            "索引对齐完成：重建 {} 个集合，未变化 {} 个，失败 {} 个",
            report.rebuilt().len(),
            report.unchanged().len(),
            report.failed().len()
        );
        report
    }
}
