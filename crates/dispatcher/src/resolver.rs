use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::debug;

use crawl_domain::{
    entities::{nil_node_id, NodeFilter, RunMode},
    repositories::NodeRepository,
    SchedulerResult,
};

/// 目标节点解析器
///
/// 根据运行模式把一次调度请求映射为目标节点ID列表。
pub struct NodeTargetResolver {
    node_repo: Arc<dyn NodeRepository>,
}

impl NodeTargetResolver {
    pub fn new(node_repo: Arc<dyn NodeRepository>) -> Self {
        Self { node_repo }
    }

    pub async fn resolve(
        &self,
        mode: RunMode,
        explicit_node_ids: &[ObjectId],
    ) -> SchedulerResult<Vec<ObjectId>> {
        let node_ids = match mode {
            RunMode::AllNodes => self.eligible_nodes().await?,
            RunMode::SelectedNodes => explicit_node_ids.to_vec(),
            // 实际节点在下游领取任务时确定
            RunMode::Random => vec![nil_node_id()],
        };

        debug!("运行模式 {} 解析出 {} 个目标节点", mode, node_ids.len());
        Ok(node_ids)
    }

    /// 请求是否会扇出到多个节点
    pub async fn is_multi_target(
        &self,
        mode: RunMode,
        explicit_node_ids: &[ObjectId],
    ) -> SchedulerResult<bool> {
        match mode {
            RunMode::AllNodes => Ok(self.eligible_nodes().await?.len() > 1),
            RunMode::SelectedNodes => Ok(explicit_node_ids.len() > 1),
            RunMode::Random => Ok(false),
        }
    }

    async fn eligible_nodes(&self) -> SchedulerResult<Vec<ObjectId>> {
        self.node_repo.find_ids(&NodeFilter::eligible()).await
    }
}
