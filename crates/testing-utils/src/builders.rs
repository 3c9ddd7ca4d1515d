//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use bson::oid::ObjectId;
use chrono::Utc;
use crawl_domain::entities::{Node, NodeStatus, RunMode, Spider, Task, TaskStatus};

/// Builder for creating test Spider entities
pub struct SpiderBuilder {
    spider: Spider,
}

impl SpiderBuilder {
    pub fn new() -> Self {
        Self {
            spider: Spider {
                id: ObjectId::new(),
                name: "test_spider".to_string(),
                cmd: "scrapy crawl test".to_string(),
                param: String::new(),
                mode: None,
                node_ids: vec![],
                priority: 0,
            },
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.spider.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.spider.name = name.to_string();
        self
    }

    pub fn with_cmd(mut self, cmd: &str) -> Self {
        self.spider.cmd = cmd.to_string();
        self
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.spider.param = param.to_string();
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.spider.mode = Some(mode);
        self
    }

    pub fn with_node_ids(mut self, node_ids: Vec<ObjectId>) -> Self {
        self.spider.node_ids = node_ids;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.spider.priority = priority;
        self
    }

    pub fn build(self) -> Spider {
        self.spider
    }
}

impl Default for SpiderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Node entities, eligible by default
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self {
            node: Node {
                id: ObjectId::new(),
                key: "worker-001".to_string(),
                name: "worker-001".to_string(),
                is_master: false,
                status: NodeStatus::Online,
                active: true,
                enabled: true,
            },
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.node.id = id;
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.node.key = key.to_string();
        self.node.name = key.to_string();
        self
    }

    pub fn master(mut self) -> Self {
        self.node.is_master = true;
        self
    }

    pub fn offline(mut self) -> Self {
        self.node.status = NodeStatus::Offline;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.node.enabled = false;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.node.active = false;
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating persisted-looking Task entities
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            task: Task {
                id: ObjectId::new(),
                spider_id: ObjectId::new(),
                node_id: ObjectId::new(),
                node_ids: vec![],
                status: TaskStatus::Pending,
                cmd: "scrapy crawl test".to_string(),
                param: String::new(),
                error: String::new(),
                pid: 0,
                schedule_id: None,
                mode: RunMode::Random,
                priority: 0,
                user_id: None,
                create_ts: now,
                update_ts: now,
            },
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_spider_id(mut self, spider_id: ObjectId) -> Self {
        self.task.spider_id = spider_id;
        self
    }

    pub fn with_node_id(mut self, node_id: ObjectId) -> Self {
        self.task.node_id = node_id;
        self
    }

    pub fn with_schedule_id(mut self, schedule_id: ObjectId) -> Self {
        self.task.schedule_id = Some(schedule_id);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.task.mode = mode;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}
