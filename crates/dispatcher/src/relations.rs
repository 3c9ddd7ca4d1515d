use std::sync::Arc;

use crawl_domain::{
    entities::{Node, Schedule, Spider, Task, TaskStat},
    repositories::{NodeRepository, ScheduleRepository, SpiderRepository, TaskStatRepository},
    SchedulerError, SchedulerResult,
};

/// 任务关联实体查询
///
/// 任务本身不保存关联对象，调用方按需显式查询。
pub struct TaskRelations {
    spider_repo: Arc<dyn SpiderRepository>,
    node_repo: Arc<dyn NodeRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    stat_repo: Arc<dyn TaskStatRepository>,
}

impl TaskRelations {
    pub fn new(
        spider_repo: Arc<dyn SpiderRepository>,
        node_repo: Arc<dyn NodeRepository>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        stat_repo: Arc<dyn TaskStatRepository>,
    ) -> Self {
        Self {
            spider_repo,
            node_repo,
            schedule_repo,
            stat_repo,
        }
    }

    /// 每个任务必须属于一个爬虫，爬虫缺失时返回 `NotFound`
    pub async fn spider_of(&self, task: &Task) -> SchedulerResult<Spider> {
        self.spider_repo
            .get_by_id(&task.spider_id)
            .await?
            .ok_or_else(|| SchedulerError::not_found("爬虫", task.spider_id))
    }

    /// 随机模式下尚未分配节点的任务返回 `None`
    pub async fn node_of(&self, task: &Task) -> SchedulerResult<Option<Node>> {
        if task.has_unresolved_node() {
            return Ok(None);
        }
        self.node_repo.get_by_id(&task.node_id).await
    }

    pub async fn schedule_of(&self, task: &Task) -> SchedulerResult<Option<Schedule>> {
        match &task.schedule_id {
            Some(schedule_id) => self.schedule_repo.get_by_id(schedule_id).await,
            None => Ok(None),
        }
    }

    pub async fn stat_of(&self, task: &Task) -> SchedulerResult<Option<TaskStat>> {
        self.stat_repo.get_by_task_id(&task.id).await
    }
}
