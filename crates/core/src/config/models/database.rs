use std::time::Duration;

use serde::{Deserialize, Serialize};

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database_name: String,
    pub connect_timeout_seconds: u64,
    pub server_selection_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database_name: "crawlab".to_string(),
            connect_timeout_seconds: 10,
            server_selection_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.uri.is_empty() {
            return Err(anyhow::anyhow!("数据库URI不能为空"));
        }

        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return Err(anyhow::anyhow!("数据库URI必须是MongoDB格式: {}", self.uri));
        }

        if self.database_name.is_empty() {
            return Err(anyhow::anyhow!("数据库名称不能为空"));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("连接超时时间必须大于0"));
        }

        if self.server_selection_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("服务器选择超时时间必须大于0"));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_seconds)
    }
}
