use async_trait::async_trait;

use crate::index::IndexSpec;
use crawl_core::SchedulerResult;

/// 存储引擎的索引操作边界
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// 列出集合上的全部索引（包含主键索引）
    async fn list_indexes(&self, collection: &str) -> SchedulerResult<Vec<IndexSpec>>;

    /// 一次性批量创建索引
    async fn create_indexes(&self, collection: &str, indexes: &[IndexSpec])
        -> SchedulerResult<()>;

    /// 删除除主键索引外的所有索引
    async fn drop_indexes_except_primary(&self, collection: &str) -> SchedulerResult<()>;
}
