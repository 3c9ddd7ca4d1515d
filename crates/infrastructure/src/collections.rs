//! 集合名称

pub const NODES: &str = "nodes";
pub const PROJECTS: &str = "projects";
pub const SPIDERS: &str = "spiders";
pub const TASKS: &str = "tasks";
pub const TASK_STATS: &str = "task_stats";
pub const SCHEDULES: &str = "schedules";
pub const USERS: &str = "users";
pub const SETTINGS: &str = "settings";
pub const TOKENS: &str = "tokens";
pub const DATA_SOURCES: &str = "data_sources";
pub const DATA_COLLECTIONS: &str = "data_collections";
pub const ROLES: &str = "roles";
pub const USER_ROLES: &str = "user_roles";
pub const PERMISSIONS: &str = "permissions";
pub const ROLE_PERMISSIONS: &str = "role_permissions";
pub const DEPENDENCIES: &str = "dependencies";
pub const DEPENDENCY_SETTINGS: &str = "dependency_settings";
pub const DEPENDENCY_LOGS: &str = "dependency_logs";
pub const DEPENDENCY_TASKS: &str = "dependency_tasks";
pub const METRICS: &str = "metrics";
pub const NOTIFICATION_REQUESTS: &str = "notification_requests";
pub const DATABASE_METRICS: &str = "database_metrics";
