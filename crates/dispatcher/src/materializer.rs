use bson::oid::ObjectId;
use chrono::Utc;

use crawl_domain::{
    entities::{RunMode, RunRequest, Spider, Task, TaskStatus},
    SchedulerError, SchedulerResult,
};

/// 合并爬虫默认值之后的运行参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    pub node_ids: Vec<ObjectId>,
    pub cmd: String,
    pub param: String,
    pub priority: i32,
    pub schedule_id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
}

impl RunOptions {
    /// 逐字段继承：请求中未设置的字段取爬虫的值
    ///
    /// 请求和爬虫都没有运行模式时返回 `InvalidRunMode`。
    pub fn inherit(spider: &Spider, request: &RunRequest) -> SchedulerResult<Self> {
        let mode = request
            .mode
            .or(spider.mode)
            .ok_or_else(|| SchedulerError::InvalidRunMode(String::new()))?;

        let node_ids = if request.node_ids.is_empty() {
            spider.node_ids.clone()
        } else {
            request.node_ids.clone()
        };

        Ok(Self {
            mode,
            node_ids,
            cmd: non_empty_or(request.cmd.as_deref(), &spider.cmd),
            param: non_empty_or(request.param.as_deref(), &spider.param),
            priority: request
                .priority
                .filter(|priority| *priority != 0)
                .unwrap_or(spider.priority),
            schedule_id: request.schedule_id,
            user_id: request.user_id,
        })
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// 任务生成器，每个目标节点生成一个任务
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskMaterializer;

impl TaskMaterializer {
    pub fn new() -> Self {
        Self
    }

    pub fn materialize(
        &self,
        spider: &Spider,
        request: &RunRequest,
        target_node_ids: &[ObjectId],
    ) -> SchedulerResult<Vec<Task>> {
        let options = RunOptions::inherit(spider, request)?;
        Ok(self.build(spider, &options, target_node_ids))
    }

    /// 生成的任务尚未持久化，ID由调度队列分配
    pub fn build(
        &self,
        spider: &Spider,
        options: &RunOptions,
        target_node_ids: &[ObjectId],
    ) -> Vec<Task> {
        let now = Utc::now();
        target_node_ids
            .iter()
            .map(|node_id| Task {
                id: ObjectId::from_bytes([0; 12]),
                spider_id: spider.id,
                node_id: *node_id,
                node_ids: options.node_ids.clone(),
                status: TaskStatus::Pending,
                cmd: options.cmd.clone(),
                param: options.param.clone(),
                error: String::new(),
                pid: 0,
                schedule_id: options.schedule_id,
                mode: options.mode,
                priority: options.priority,
                user_id: options.user_id,
                create_ts: now,
                update_ts: now,
            })
            .collect()
    }
}
