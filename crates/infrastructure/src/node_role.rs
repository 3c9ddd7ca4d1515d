use crawl_core::NodeConfig;
use crawl_domain::ports::NodeRoleProvider;

/// 由配置决定的节点角色
#[derive(Debug, Clone)]
pub struct ConfigNodeRole {
    is_master: bool,
    node_key: String,
}

impl ConfigNodeRole {
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            is_master: config.is_master,
            node_key: config.node_key.clone(),
        }
    }

    pub fn node_key(&self) -> &str {
        &self.node_key
    }
}

impl NodeRoleProvider for ConfigNodeRole {
    fn is_master(&self) -> bool {
        self.is_master
    }
}
