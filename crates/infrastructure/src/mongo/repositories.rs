use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::FindOptions,
    Collection, Database,
};
use tracing::{debug, instrument};

use crawl_core::{SchedulerError, SchedulerResult};
use crawl_domain::{
    entities::{Node, NodeFilter, Schedule, Spider, TaskStat},
    repositories::{NodeRepository, ScheduleRepository, SpiderRepository, TaskStatRepository},
};

use crate::collections;

/// 节点过滤条件转换为查询文档，未设置的字段不参与过滤
pub fn node_filter_document(filter: &NodeFilter) -> Document {
    let mut query = Document::new();
    if let Some(active) = filter.active {
        query.insert("active", active);
    }
    if let Some(enabled) = filter.enabled {
        query.insert("enabled", enabled);
    }
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    query
}

async fn find_by_id<T>(collection: &Collection<T>, id: &ObjectId) -> SchedulerResult<Option<T>>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    collection
        .find_one(doc! { "_id": *id }, None)
        .await
        .map_err(|e| SchedulerError::storage("find_one", collection.name(), e))
}

pub struct MongoNodeRepository {
    nodes: Collection<Node>,
    ids: Collection<Document>,
}

impl MongoNodeRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            nodes: database.collection(collections::NODES),
            ids: database.collection(collections::NODES),
        }
    }
}

#[async_trait]
impl NodeRepository for MongoNodeRepository {
    #[instrument(skip(self))]
    async fn find_ids(&self, filter: &NodeFilter) -> SchedulerResult<Vec<ObjectId>> {
        let query = node_filter_document(filter);
        let options = FindOptions::builder().projection(doc! { "_id": 1 }).build();

        let documents: Vec<Document> = self
            .ids
            .find(query, options)
            .await
            .map_err(|e| SchedulerError::storage("find", collections::NODES, e))?
            .try_collect()
            .await
            .map_err(|e| SchedulerError::storage("find", collections::NODES, e))?;

        let ids = documents
            .iter()
            .map(|document| {
                document
                    .get_object_id("_id")
                    .map_err(|e| SchedulerError::Serialization(format!("节点ID格式错误: {e}")))
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        debug!("查询到 {} 个节点", ids.len());
        Ok(ids)
    }

    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Node>> {
        find_by_id(&self.nodes, id).await
    }
}

pub struct MongoSpiderRepository {
    spiders: Collection<Spider>,
}

impl MongoSpiderRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            spiders: database.collection(collections::SPIDERS),
        }
    }
}

#[async_trait]
impl SpiderRepository for MongoSpiderRepository {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Spider>> {
        find_by_id(&self.spiders, id).await
    }
}

pub struct MongoScheduleRepository {
    schedules: Collection<Schedule>,
}

impl MongoScheduleRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            schedules: database.collection(collections::SCHEDULES),
        }
    }
}

#[async_trait]
impl ScheduleRepository for MongoScheduleRepository {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Schedule>> {
        find_by_id(&self.schedules, id).await
    }
}

pub struct MongoTaskStatRepository {
    stats: Collection<TaskStat>,
}

impl MongoTaskStatRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            stats: database.collection(collections::TASK_STATS),
        }
    }
}

#[async_trait]
impl TaskStatRepository for MongoTaskStatRepository {
    async fn get_by_task_id(&self, task_id: &ObjectId) -> SchedulerResult<Option<TaskStat>> {
        find_by_id(&self.stats, task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl_domain::entities::NodeStatus;

    #[test]
    fn test_eligible_filter_document() {
        let query = node_filter_document(&NodeFilter::eligible());
        assert_eq!(
            query,
            doc! { "active": true, "enabled": true, "status": "online" }
        );
    }

    #[test]
    fn test_unset_fields_are_not_filtered() {
        assert!(node_filter_document(&NodeFilter::default()).is_empty());

        let filter = NodeFilter {
            status: Some(NodeStatus::Offline),
            ..NodeFilter::default()
        };
        assert_eq!(node_filter_document(&filter), doc! { "status": "offline" });
    }
}
