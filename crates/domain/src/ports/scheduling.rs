use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::entities::Task;
use crawl_core::SchedulerResult;

/// 任务调度队列
///
/// 负责分配任务ID并持久化任务。没有幂等键，重复调用会产生重复任务。
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, task: Task, user_id: Option<ObjectId>) -> SchedulerResult<Task>;
}

/// 当前进程的节点角色
pub trait NodeRoleProvider: Send + Sync {
    fn is_master(&self) -> bool;
}
