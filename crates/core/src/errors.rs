use std::fmt::Display;

use thiserror::Error;

/// 调度器错误类型定义
///
/// 错误需要在一次性构造的协调器句柄中缓存并分发给所有调用方，
/// 因此所有变体只携带可克隆的上下文信息。
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("当前进程不是主节点，禁止调度任务")]
    RoleViolation,

    #[error("无效的运行模式: {0}")]
    InvalidRunMode(String),

    #[error("{entity}未找到: {id}")]
    NotFound { entity: String, id: String },

    #[error("存储操作失败 [{operation} {target}]: {message}")]
    Storage {
        operation: String,
        target: String,
        message: String,
    },

    #[error("批量调度部分失败，已入队 {} 个任务: {source}", .enqueued.len())]
    PartialBatch {
        enqueued: Vec<String>,
        source: Box<SchedulerError>,
    },

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl SchedulerError {
    pub fn not_found(entity: impl Into<String>, id: impl Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// 包装下游存储/队列错误，附带操作名和目标集合
    pub fn storage(
        operation: impl Into<String>,
        target: impl Into<String>,
        err: impl Display,
    ) -> Self {
        Self::Storage {
            operation: operation.into(),
            target: target.into(),
            message: err.to_string(),
        }
    }

    /// 调用方输入错误（需要修正请求），其余为集群侧错误
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::InvalidRunMode(_) | Self::NotFound { .. } => true,
            Self::PartialBatch { source, .. } => source.is_caller_error(),
            _ => false,
        }
    }

    /// 部分失败时已经入队的任务ID
    pub fn enqueued_task_ids(&self) -> &[String] {
        match self {
            Self::PartialBatch { enqueued, .. } => enqueued,
            _ => &[],
        }
    }
}

/// 统一的Result类型
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
