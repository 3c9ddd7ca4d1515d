use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson::oid::ObjectId, Collection, Database};
use tracing::{debug, instrument};

use crawl_core::{SchedulerError, SchedulerResult};
use crawl_domain::{
    entities::{Task, TaskStat},
    ports::TaskQueue,
};

use crate::collections;

/// 基于MongoDB的调度队列
///
/// 写入同ID的统计记录和任务记录，实际执行由节点侧的执行器领取。
pub struct MongoTaskQueue {
    tasks: Collection<Task>,
    stats: Collection<TaskStat>,
}

impl MongoTaskQueue {
    pub fn new(database: &Database) -> Self {
        Self {
            tasks: database.collection(collections::TASKS),
            stats: database.collection(collections::TASK_STATS),
        }
    }
}

#[async_trait]
impl TaskQueue for MongoTaskQueue {
    #[instrument(skip_all, fields(spider_id = %task.spider_id, node_id = %task.node_id))]
    async fn enqueue(&self, mut task: Task, user_id: Option<ObjectId>) -> SchedulerResult<Task> {
        let now = Utc::now();
        task.id = ObjectId::new();
        task.user_id = user_id;
        task.create_ts = now;
        task.update_ts = now;

        // 任务记录最后写入，写入成功即视为已入队
        self.stats
            .insert_one(TaskStat::for_task(&task), None)
            .await
            .map_err(|e| SchedulerError::storage("insert_one", collections::TASK_STATS, e))?;

        self.tasks
            .insert_one(&task, None)
            .await
            .map_err(|e| SchedulerError::storage("insert_one", collections::TASKS, e))?;

        debug!("任务 {} 已写入调度队列", task.id);
        Ok(task)
    }
}
