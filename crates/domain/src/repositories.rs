//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::entities::{Node, NodeFilter, Schedule, Spider, TaskStat};
use crawl_core::SchedulerResult;

/// 节点目录
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// 按目录返回顺序列出匹配条件的节点ID
    async fn find_ids(&self, filter: &NodeFilter) -> SchedulerResult<Vec<ObjectId>>;
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Node>>;
}

/// 爬虫仓储
#[async_trait]
pub trait SpiderRepository: Send + Sync {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Spider>>;
}

/// 定时计划仓储
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Schedule>>;
}

/// 任务统计仓储
#[async_trait]
pub trait TaskStatRepository: Send + Sync {
    async fn get_by_task_id(&self, task_id: &ObjectId) -> SchedulerResult<Option<TaskStat>>;
}
