use std::sync::{Arc, OnceLock};

use bson::oid::ObjectId;
use metrics::counter;
use tracing::{debug, error, info, warn};

use crawl_domain::{
    entities::RunRequest,
    ports::{NodeRoleProvider, TaskQueue},
    repositories::{NodeRepository, SpiderRepository},
    SchedulerError, SchedulerResult,
};

use crate::materializer::{RunOptions, TaskMaterializer};
use crate::resolver::NodeTargetResolver;

/// 构造调度协调器所需的协作者
#[derive(Clone)]
pub struct CoordinatorDeps {
    pub role: Arc<dyn NodeRoleProvider>,
    pub node_repo: Arc<dyn NodeRepository>,
    pub spider_repo: Arc<dyn SpiderRepository>,
    pub task_queue: Arc<dyn TaskQueue>,
}

/// 调度协调器
///
/// 串联 目标节点解析 -> 任务生成 -> 入队。只能在主节点上构造。
pub struct SchedulingCoordinator {
    resolver: NodeTargetResolver,
    materializer: TaskMaterializer,
    spider_repo: Arc<dyn SpiderRepository>,
    task_queue: Arc<dyn TaskQueue>,
}

impl SchedulingCoordinator {
    pub fn new(deps: &CoordinatorDeps) -> SchedulerResult<Self> {
        if !deps.role.is_master() {
            warn!("当前节点不是主节点，拒绝创建调度协调器");
            return Err(SchedulerError::RoleViolation);
        }

        info!("调度协调器已创建");
        Ok(Self {
            resolver: NodeTargetResolver::new(deps.node_repo.clone()),
            materializer: TaskMaterializer::new(),
            spider_repo: deps.spider_repo.clone(),
            task_queue: deps.task_queue.clone(),
        })
    }

    pub fn resolver(&self) -> &NodeTargetResolver {
        &self.resolver
    }

    /// 为爬虫创建任务并逐个入队，返回入队后的任务ID
    ///
    /// 任一入队失败立即返回错误，之前已入队的任务不会回滚。
    #[tracing::instrument(skip_all, fields(spider_id = %spider_id))]
    pub async fn schedule(
        &self,
        spider_id: &ObjectId,
        request: RunRequest,
    ) -> SchedulerResult<Vec<ObjectId>> {
        let spider = self
            .spider_repo
            .get_by_id(spider_id)
            .await?
            .ok_or_else(|| SchedulerError::not_found("爬虫", spider_id))?;

        let options = RunOptions::inherit(&spider, &request)?;
        let targets = self
            .resolver
            .resolve(options.mode, &options.node_ids)
            .await?;
        let tasks = self.materializer.build(&spider, &options, &targets);

        if tasks.is_empty() {
            info!("爬虫 {} 在模式 {} 下没有目标节点，未创建任务", spider.name, options.mode);
            return Ok(Vec::new());
        }

        let mut task_ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            let node_id = task.node_id;
            match self.task_queue.enqueue(task, options.user_id).await {
                Ok(persisted) => {
                    debug!("任务 {} 已入队，目标节点 {}", persisted.id, node_id);
                    task_ids.push(persisted.id);
                }
                Err(e) => {
                    counter!("crawl_schedule_failures_total").increment(1);
                    error!(
                        "爬虫 {} 的任务入队失败（目标节点 {}），已入队 {} 个: {}",
                        spider.name,
                        node_id,
                        task_ids.len(),
                        e
                    );
                    if task_ids.is_empty() {
                        return Err(e);
                    }
                    return Err(SchedulerError::PartialBatch {
                        enqueued: task_ids.iter().map(|id| id.to_hex()).collect(),
                        source: Box::new(e),
                    });
                }
            }
        }

        counter!("crawl_tasks_scheduled_total", "mode" => options.mode.as_str())
            .increment(task_ids.len() as u64);
        info!(
            "爬虫 {} 调度完成，模式 {}，共创建 {} 个任务",
            spider.name,
            options.mode,
            task_ids.len()
        );
        Ok(task_ids)
    }
}

/// 调度协调器句柄
///
/// 由应用组装根持有。首次访问时构造协调器，成功或失败的结果都会被缓存，
/// 并发的首次调用只会触发一次构造。
pub struct CoordinatorHandle {
    deps: CoordinatorDeps,
    cell: OnceLock<SchedulerResult<Arc<SchedulingCoordinator>>>,
}

impl CoordinatorHandle {
    pub fn new(deps: CoordinatorDeps) -> Self {
        Self {
            deps,
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> SchedulerResult<Arc<SchedulingCoordinator>> {
        self.cell
            .get_or_init(|| SchedulingCoordinator::new(&self.deps).map(Arc::new))
            .clone()
    }

    pub async fn schedule(
        &self,
        spider_id: &ObjectId,
        request: RunRequest,
    ) -> SchedulerResult<Vec<ObjectId>> {
        self.get()?.schedule(spider_id, request).await
    }
}
