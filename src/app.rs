use std::sync::Arc;

use anyhow::{Context, Result};
use bson::oid::ObjectId;
use crawl_core::AppConfig;
use crawl_dispatcher::{CoordinatorDeps, CoordinatorHandle, TaskRelations};
use crawl_domain::{entities::RunRequest, ports::IndexStore, SchedulerResult};
use crawl_infrastructure::{
    index_catalog, ConfigNodeRole, IndexReconciler, MongoStore, ReconcileReport,
};
use tracing::{info, warn};

/// 应用组装根
///
/// 持有协调器句柄和索引对齐器，一个进程只创建一个实例。
pub struct Application {
    config: AppConfig,
    store: Option<MongoStore>,
    coordinator: CoordinatorHandle,
    reconciler: IndexReconciler,
    relations: Option<TaskRelations>,
}

impl Application {
    /// 连接MongoDB并组装各组件
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序，节点: {}", config.node.node_key);

        let store = MongoStore::connect(&config.database)
            .await
            .context("连接MongoDB失败")?;

        let deps = CoordinatorDeps {
            role: Arc::new(ConfigNodeRole::from_config(&config.node)),
            node_repo: Arc::new(store.node_repository()),
            spider_repo: Arc::new(store.spider_repository()),
            task_queue: Arc::new(store.task_queue()),
        };
        let relations = TaskRelations::new(
            Arc::new(store.spider_repository()),
            Arc::new(store.node_repository()),
            Arc::new(store.schedule_repository()),
            Arc::new(store.task_stat_repository()),
        );
        let index_store = Arc::new(store.index_store());

        let mut app = Self::from_parts(config, deps, index_store);
        app.store = Some(store);
        app.relations = Some(relations);
        Ok(app)
    }

    /// 使用现成的协作者组装，不建立数据库连接
    pub fn from_parts(
        config: AppConfig,
        deps: CoordinatorDeps,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            config,
            store: None,
            coordinator: CoordinatorHandle::new(deps),
            reconciler: IndexReconciler::new(index_store),
            relations: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    pub fn relations(&self) -> Option<&TaskRelations> {
        self.relations.as_ref()
    }

    pub async fn reconcile_indexes(&self) -> ReconcileReport {
        self.reconciler.reconcile_all(&index_catalog()).await
    }

    pub async fn schedule(
        &self,
        spider_id: &ObjectId,
        request: RunRequest,
    ) -> SchedulerResult<Vec<ObjectId>> {
        self.coordinator.schedule(spider_id, request).await
    }

    /// 进程启动：按配置对齐索引，主节点预先构造调度协调器
    pub async fn start(&self) -> Result<()> {
        if self.config.reconcile.on_startup {
            let report = self.reconcile_indexes().await;
            if !report.is_success() {
                warn!("{} 个集合索引对齐失败，服务继续启动", report.failed().len());
            }
        } else {
            info!("已关闭启动时索引对齐");
        }

        if self.config.node.is_master {
            self.coordinator
                .get()
                .context("创建调度协调器失败")?;
            info!("主节点调度协调器已就绪");
        } else {
            info!("当前为工作节点，不提供调度");
        }
        Ok(())
    }

    pub async fn shutdown(self) {
        if let Some(store) = self.store {
            store.shutdown().await;
        }
        info!("应用程序已停止");
    }
}
