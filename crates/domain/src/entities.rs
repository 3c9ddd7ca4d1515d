use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crawl_core::{SchedulerError, SchedulerResult};

/// 随机模式下的占位节点ID（全零ObjectId），由下游队列在领取任务时解析为真实节点
pub fn nil_node_id() -> ObjectId {
    ObjectId::from_bytes([0; 12])
}

/// 运行模式
///
/// 决定一次调度请求产生的任务数量：
///
/// - `AllNodes`: 每个可用节点一个任务
/// - `SelectedNodes`: 显式节点列表中的每个节点一个任务
/// - `Random`: 一个任务，目标节点延迟到领取时确定
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RunMode {
    #[serde(rename = "all-nodes")]
    AllNodes,
    #[serde(rename = "selected-nodes")]
    SelectedNodes,
    #[serde(rename = "random")]
    Random,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::AllNodes => "all-nodes",
            RunMode::SelectedNodes => "selected-nodes",
            RunMode::Random => "random",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> SchedulerResult<Self> {
        match s {
            "all-nodes" => Ok(RunMode::AllNodes),
            "selected-nodes" => Ok(RunMode::SelectedNodes),
            "random" => Ok(RunMode::Random),
            other => Err(SchedulerError::InvalidRunMode(other.to_string())),
        }
    }
}

/// 存量文档中未设置的模式以空字符串保存
fn deserialize_optional_mode<'de, D>(deserializer: D) -> Result<Option<RunMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// 爬虫（任务定义）
///
/// 调度器只读取爬虫的默认执行参数，不会修改爬虫本身。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spider {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub param: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<RunMode>,
    #[serde(default)]
    pub node_ids: Vec<ObjectId>,
    #[serde(default)]
    pub priority: i32,
}

/// 任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Assigned,
    Running,
    Finished,
    Error,
    Cancelled,
    Abnormal,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Finished | TaskStatus::Error | TaskStatus::Cancelled | TaskStatus::Abnormal
        )
    }
}

/// 任务（一次调度产生的执行实例）
///
/// 关联的爬虫、节点、定时计划和统计记录不作为字段保存，
/// 需要时通过 `TaskRelations` 显式查询。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub spider_id: ObjectId,
    pub node_id: ObjectId,
    #[serde(default)]
    pub node_ids: Vec<ObjectId>,
    pub status: TaskStatus,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub param: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub pid: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<ObjectId>,
    pub mode: RunMode,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub create_ts: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub update_ts: DateTime<Utc>,
}

impl Task {
    /// 目标节点尚未确定（随机模式）
    pub fn has_unresolved_node(&self) -> bool {
        self.node_id == nil_node_id()
    }
}

/// 任务统计记录，与任务共用同一个ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStat {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub result_count: i64,
    #[serde(default)]
    pub error_log_count: i64,
    #[serde(default)]
    pub wait_duration: i64,
    #[serde(default)]
    pub runtime_duration: i64,
    #[serde(default)]
    pub total_duration: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub create_ts: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub update_ts: DateTime<Utc>,
}

impl TaskStat {
    pub fn for_task(task: &Task) -> Self {
        Self {
            id: task.id,
            result_count: 0,
            error_log_count: 0,
            wait_duration: 0,
            runtime_duration: 0,
            total_duration: 0,
            create_ts: task.create_ts,
            update_ts: task.update_ts,
        }
    }
}

/// 定时计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub spider_id: ObjectId,
    #[serde(default)]
    pub cron: String,
    #[serde(default)]
    pub enabled: bool,
}

/// 节点状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Online => "online",
            NodeStatus::Offline => "offline",
        }
    }
}

/// 执行节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_master: bool,
    pub status: NodeStatus,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// 节点查询条件，`None` 表示不限制该字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub active: Option<bool>,
    pub enabled: Option<bool>,
    pub status: Option<NodeStatus>,
}

impl NodeFilter {
    /// 可接收任务的节点：已激活、已启用且在线
    ///
    /// 全节点解析和多节点判断都必须使用这一条件。
    pub const fn eligible() -> Self {
        Self {
            active: Some(true),
            enabled: Some(true),
            status: Some(NodeStatus::Online),
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.active.is_none_or(|active| node.active == active)
            && self.enabled.is_none_or(|enabled| node.enabled == enabled)
            && self.status.is_none_or(|status| node.status == status)
    }
}

/// 调度请求（不持久化）
///
/// 未设置的字段（`None`、空字符串或0）在生成任务时从爬虫继承。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    pub mode: Option<RunMode>,
    #[serde(default)]
    pub node_ids: Vec<ObjectId>,
    pub cmd: Option<String>,
    pub param: Option<String>,
    pub priority: Option<i32>,
    pub schedule_id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
}

impl RunRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_node_ids(mut self, node_ids: Vec<ObjectId>) -> Self {
        self.node_ids = node_ids;
        self
    }

    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_schedule_id(mut self, schedule_id: ObjectId) -> Self {
        self.schedule_id = Some(schedule_id);
        self
    }

    pub fn with_user_id(mut self, user_id: ObjectId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
