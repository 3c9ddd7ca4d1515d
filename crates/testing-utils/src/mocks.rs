//! Mock implementations for all repository and port traits
//!
//! In-memory implementations used for unit testing without a running
//! MongoDB. Stores record every call so tests can assert on query
//! predicates, enqueue order and index mutations.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use crawl_core::{SchedulerError, SchedulerResult};
use crawl_domain::entities::{Node, NodeFilter, Schedule, Spider, Task, TaskStat};
use crawl_domain::index::{IndexDirection, IndexSpec};
use crawl_domain::ports::{IndexStore, NodeRoleProvider, TaskQueue};
use crawl_domain::repositories::{
    NodeRepository, ScheduleRepository, SpiderRepository, TaskStatRepository,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock node directory, keeps insertion order like a natural-order scan
#[derive(Debug, Clone, Default)]
pub struct MockNodeRepository {
    nodes: Arc<Mutex<Vec<Node>>>,
    filters_seen: Arc<Mutex<Vec<NodeFilter>>>,
    fail_queries: Arc<Mutex<bool>>,
}

impl MockNodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let repo = Self::new();
        *repo.nodes.lock().unwrap() = nodes;
        repo
    }

    pub fn insert(&self, node: Node) {
        self.nodes.lock().unwrap().push(node);
    }

    pub fn fail_queries(&self, fail: bool) {
        *self.fail_queries.lock().unwrap() = fail;
    }

    /// 每次 `find_ids` 调用使用的过滤条件
    pub fn filters_seen(&self) -> Vec<NodeFilter> {
        self.filters_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeRepository for MockNodeRepository {
    async fn find_ids(&self, filter: &NodeFilter) -> SchedulerResult<Vec<ObjectId>> {
        self.filters_seen.lock().unwrap().push(*filter);
        if *self.fail_queries.lock().unwrap() {
            return Err(SchedulerError::storage("find", "nodes", "mock query failure"));
        }
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .iter()
            .filter(|node| filter.matches(node))
            .map(|node| node.id)
            .collect())
    }

    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Node>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes.iter().find(|node| node.id == *id).cloned())
    }
}

/// Mock implementation of SpiderRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockSpiderRepository {
    spiders: Arc<Mutex<HashMap<ObjectId, Spider>>>,
}

impl MockSpiderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spiders(spiders: Vec<Spider>) -> Self {
        let repo = Self::new();
        for spider in spiders {
            repo.insert(spider);
        }
        repo
    }

    pub fn insert(&self, spider: Spider) {
        self.spiders.lock().unwrap().insert(spider.id, spider);
    }
}

#[async_trait]
impl SpiderRepository for MockSpiderRepository {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Spider>> {
        Ok(self.spiders.lock().unwrap().get(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockScheduleRepository {
    schedules: Arc<Mutex<HashMap<ObjectId, Schedule>>>,
}

impl MockScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, schedule: Schedule) {
        self.schedules.lock().unwrap().insert(schedule.id, schedule);
    }
}

#[async_trait]
impl ScheduleRepository for MockScheduleRepository {
    async fn get_by_id(&self, id: &ObjectId) -> SchedulerResult<Option<Schedule>> {
        Ok(self.schedules.lock().unwrap().get(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockTaskStatRepository {
    stats: Arc<Mutex<HashMap<ObjectId, TaskStat>>>,
}

impl MockTaskStatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stat: TaskStat) {
        self.stats.lock().unwrap().insert(stat.id, stat);
    }
}

#[async_trait]
impl TaskStatRepository for MockTaskStatRepository {
    async fn get_by_task_id(&self, task_id: &ObjectId) -> SchedulerResult<Option<TaskStat>> {
        Ok(self.stats.lock().unwrap().get(task_id).cloned())
    }
}

/// Mock scheduling queue
///
/// Assigns ids like the real queue and can be told to fail on the n-th call.
#[derive(Debug, Clone, Default)]
pub struct MockTaskQueue {
    enqueued: Arc<Mutex<Vec<(Task, Option<ObjectId>)>>>,
    calls: Arc<AtomicUsize>,
    fail_at_call: Arc<Mutex<Option<usize>>>,
}

impl MockTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `call_index` 次（从0开始）enqueue 调用返回错误
    pub fn fail_at_call(&self, call_index: usize) {
        *self.fail_at_call.lock().unwrap() = Some(call_index);
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.enqueued
            .lock()
            .unwrap()
            .iter()
            .map(|(task, _)| task.clone())
            .collect()
    }

    pub fn user_ids(&self) -> Vec<Option<ObjectId>> {
        self.enqueued
            .lock()
            .unwrap()
            .iter()
            .map(|(_, user_id)| *user_id)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.enqueued.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskQueue for MockTaskQueue {
    async fn enqueue(&self, mut task: Task, user_id: Option<ObjectId>) -> SchedulerResult<Task> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_at_call.lock().unwrap() == Some(call_index) {
            return Err(SchedulerError::storage(
                "enqueue",
                "tasks",
                "mock enqueue failure",
            ));
        }

        let now = Utc::now();
        task.id = ObjectId::new();
        task.user_id = user_id;
        task.create_ts = now;
        task.update_ts = now;
        self.enqueued.lock().unwrap().push((task.clone(), user_id));
        Ok(task)
    }
}

/// 静态节点角色，记录角色检查次数
#[derive(Debug, Default)]
pub struct StaticNodeRole {
    is_master: bool,
    checks: AtomicUsize,
}

impl StaticNodeRole {
    pub fn master() -> Self {
        Self {
            is_master: true,
            checks: AtomicUsize::new(0),
        }
    }

    pub fn worker() -> Self {
        Self {
            is_master: false,
            checks: AtomicUsize::new(0),
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl NodeRoleProvider for StaticNodeRole {
    fn is_master(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.is_master
    }
}

/// 需要模拟失败的索引操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexOperation {
    List,
    Create,
    Drop,
}

/// Mock index store
///
/// Every collection implicitly carries the `_id_` primary index. Creating an
/// index whose key pattern already exists with different options fails the
/// same way the storage engine does.
#[derive(Debug, Clone, Default)]
pub struct MockIndexStore {
    collections: Arc<Mutex<HashMap<String, Vec<IndexSpec>>>>,
    failures: Arc<Mutex<HashSet<(String, IndexOperation)>>>,
    list_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
    drop_calls: Arc<AtomicUsize>,
}

impl MockIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置集合上的非主键索引
    pub fn seed(&self, collection: &str, indexes: Vec<IndexSpec>) {
        let mut all = vec![IndexSpec::primary()];
        all.extend(indexes.into_iter().map(with_generated_name));
        self.collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), all);
    }

    pub fn fail_on(&self, collection: &str, operation: IndexOperation) {
        self.failures
            .lock()
            .unwrap()
            .insert((collection.to_string(), operation));
    }

    pub fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_else(|| vec![IndexSpec::primary()])
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn drop_calls(&self) -> usize {
        self.drop_calls.load(Ordering::SeqCst)
    }

    /// 创建和删除调用总数
    pub fn mutation_count(&self) -> usize {
        self.create_calls() + self.drop_calls()
    }

    fn check_failure(&self, collection: &str, operation: IndexOperation) -> SchedulerResult<()> {
        if self
            .failures
            .lock()
            .unwrap()
            .contains(&(collection.to_string(), operation))
        {
            return Err(SchedulerError::storage(
                format!("{operation:?}").to_lowercase(),
                collection,
                "mock index failure",
            ));
        }
        Ok(())
    }
}

/// 模拟存储引擎的默认索引名，如 `type_1_node_id_1`
fn with_generated_name(mut index: IndexSpec) -> IndexSpec {
    if index.name.is_none() {
        let parts: Vec<String> = index
            .keys
            .iter()
            .map(|field| {
                let direction = match &field.direction {
                    IndexDirection::Ascending => "1".to_string(),
                    IndexDirection::Descending => "-1".to_string(),
                    IndexDirection::Special(kind) => kind.clone(),
                };
                format!("{}_{}", field.name, direction)
            })
            .collect();
        index.name = Some(parts.join("_"));
    }
    index
}

#[async_trait]
impl IndexStore for MockIndexStore {
    async fn list_indexes(&self, collection: &str) -> SchedulerResult<Vec<IndexSpec>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(collection, IndexOperation::List)?;
        Ok(self.indexes(collection))
    }

    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexSpec],
    ) -> SchedulerResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(collection, IndexOperation::Create)?;

        let mut collections = self.collections.lock().unwrap();
        let live = collections
            .entry(collection.to_string())
            .or_insert_with(|| vec![IndexSpec::primary()]);

        for index in indexes {
            let index = with_generated_name(index.clone());
            match live.iter().find(|l| l.signature() == index.signature()) {
                Some(existing)
                    if existing.unique != index.unique
                        || existing.expire_after_seconds != index.expire_after_seconds =>
                {
                    return Err(SchedulerError::storage(
                        "create_indexes",
                        collection,
                        format!("IndexOptionsConflict: {}", index.signature()),
                    ));
                }
                Some(_) => {}
                None => live.push(index),
            }
        }
        Ok(())
    }

    async fn drop_indexes_except_primary(&self, collection: &str) -> SchedulerResult<()> {
        self.drop_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(collection, IndexOperation::Drop)?;

        let mut collections = self.collections.lock().unwrap();
        if let Some(live) = collections.get_mut(collection) {
            live.retain(IndexSpec::is_primary);
        }
        Ok(())
    }
}
