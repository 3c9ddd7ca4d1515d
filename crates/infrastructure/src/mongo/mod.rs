//! MongoDB 存储适配器

pub mod index_store;
pub mod repositories;
pub mod task_queue;

pub use index_store::MongoIndexStore;
pub use repositories::{
    MongoNodeRepository, MongoScheduleRepository, MongoSpiderRepository, MongoTaskStatRepository,
};
pub use task_queue::MongoTaskQueue;

use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tracing::{debug, info};

use crawl_core::{DatabaseConfig, SchedulerError, SchedulerResult};

/// MongoDB 连接，所有仓储共享同一个客户端
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// 按配置建立连接并执行一次 ping
    pub async fn connect(config: &DatabaseConfig) -> SchedulerResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| SchedulerError::Configuration(format!("无效的MongoDB连接串: {e}")))?;
        options.app_name = Some("crawl-scheduler".to_string());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.server_selection_timeout());

        let client = Client::with_options(options)
            .map_err(|e| SchedulerError::storage("connect", &config.database_name, e))?;
        let store = Self::from_client(client, &config.database_name);
        store.ping().await?;

        info!("已连接MongoDB数据库: {}", config.database_name);
        Ok(store)
    }

    pub fn from_client(client: Client, database_name: &str) -> Self {
        let database = client.database(database_name);
        Self { client, database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn ping(&self) -> SchedulerResult<()> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| SchedulerError::storage("ping", self.database.name(), e))?;
        debug!("MongoDB ping 成功");
        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB连接已关闭");
    }

    pub fn node_repository(&self) -> MongoNodeRepository {
        MongoNodeRepository::new(&self.database)
    }

    pub fn spider_repository(&self) -> MongoSpiderRepository {
        MongoSpiderRepository::new(&self.database)
    }

    pub fn schedule_repository(&self) -> MongoScheduleRepository {
        MongoScheduleRepository::new(&self.database)
    }

    pub fn task_stat_repository(&self) -> MongoTaskStatRepository {
        MongoTaskStatRepository::new(&self.database)
    }

    pub fn task_queue(&self) -> MongoTaskQueue {
        MongoTaskQueue::new(&self.database)
    }

    pub fn index_store(&self) -> MongoIndexStore {
        MongoIndexStore::new(self.database.clone())
    }
}
