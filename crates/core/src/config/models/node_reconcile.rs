use serde::{Deserialize, Serialize};

/// 当前节点角色配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub is_master: bool,
    pub node_key: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            is_master: true,
            node_key: "master".to_string(),
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node_key.is_empty() {
            return Err(anyhow::anyhow!("节点Key不能为空"));
        }

        if self.node_key.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!("节点Key不能包含空白字符: {}", self.node_key));
        }

        Ok(())
    }
}

/// 索引对齐配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// 进程启动时执行一次全量索引对齐
    pub on_startup: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { on_startup: true }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
