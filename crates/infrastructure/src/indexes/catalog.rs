use crawl_domain::index::IndexSpec;

use crate::collections::*;

const ONE_DAY_SECONDS: u64 = 60 * 60 * 24;
const SEVEN_DAYS_SECONDS: u64 = ONE_DAY_SECONDS * 7;
const THIRTY_DAYS_SECONDS: u64 = ONE_DAY_SECONDS * 30;

/// 一个集合期望的索引集合
#[derive(Debug, Clone)]
pub struct CollectionIndexes {
    pub collection: &'static str,
    pub indexes: Vec<IndexSpec>,
}

impl CollectionIndexes {
    fn new(collection: &'static str, indexes: Vec<IndexSpec>) -> Self {
        Self {
            collection,
            indexes,
        }
    }
}

/// 所有集合的期望索引，按声明顺序处理
pub fn index_catalog() -> Vec<CollectionIndexes> {
    vec![
        CollectionIndexes::new(
            NODES,
            vec![
                IndexSpec::asc("key"),
                IndexSpec::asc("name"),
                IndexSpec::asc("is_master"),
                IndexSpec::asc("status"),
                IndexSpec::asc("enabled"),
                IndexSpec::asc("active"),
            ],
        ),
        CollectionIndexes::new(PROJECTS, vec![IndexSpec::asc("name")]),
        CollectionIndexes::new(
            SPIDERS,
            vec![
                IndexSpec::asc("name"),
                IndexSpec::asc("project_id"),
                IndexSpec::asc("col_id"),
            ],
        ),
        CollectionIndexes::new(
            TASKS,
            vec![
                IndexSpec::asc("spider_id"),
                IndexSpec::asc("status"),
                IndexSpec::asc("node_id"),
                IndexSpec::asc("schedule_id"),
                IndexSpec::asc("mode"),
                IndexSpec::asc("priority"),
                IndexSpec::desc("create_ts").expire_after(THIRTY_DAYS_SECONDS),
            ],
        ),
        CollectionIndexes::new(
            TASK_STATS,
            vec![IndexSpec::desc("create_ts").expire_after(THIRTY_DAYS_SECONDS)],
        ),
        CollectionIndexes::new(
            SCHEDULES,
            vec![
                IndexSpec::asc("name"),
                IndexSpec::asc("spider_id"),
                IndexSpec::asc("enabled"),
            ],
        ),
        CollectionIndexes::new(
            USERS,
            vec![
                IndexSpec::asc("username"),
                IndexSpec::asc("role"),
                IndexSpec::asc("email"),
            ],
        ),
        CollectionIndexes::new(SETTINGS, vec![IndexSpec::asc("key").unique()]),
        CollectionIndexes::new(TOKENS, vec![IndexSpec::asc("name")]),
        CollectionIndexes::new(DATA_SOURCES, vec![IndexSpec::asc("name")]),
        CollectionIndexes::new(DATA_COLLECTIONS, vec![IndexSpec::asc("name")]),
        CollectionIndexes::new(ROLES, vec![IndexSpec::asc("key").unique()]),
        CollectionIndexes::new(
            USER_ROLES,
            vec![
                IndexSpec::compound(&["user_id", "role_id"]).unique(),
                IndexSpec::compound(&["role_id", "user_id"]).unique(),
            ],
        ),
        CollectionIndexes::new(PERMISSIONS, vec![IndexSpec::asc("key").unique()]),
        CollectionIndexes::new(
            ROLE_PERMISSIONS,
            vec![
                IndexSpec::compound(&["role_id", "permission_id"]).unique(),
                IndexSpec::compound(&["permission_id", "role_id"]).unique(),
            ],
        ),
        CollectionIndexes::new(
            DEPENDENCIES,
            vec![IndexSpec::compound(&["type", "node_id", "name"]).unique()],
        ),
        CollectionIndexes::new(
            DEPENDENCY_SETTINGS,
            vec![IndexSpec::compound(&["type", "node_id", "name"]).unique()],
        ),
        CollectionIndexes::new(
            DEPENDENCY_LOGS,
            vec![
                IndexSpec::asc("task_id"),
                IndexSpec::asc("update_ts").expire_after(ONE_DAY_SECONDS),
            ],
        ),
        CollectionIndexes::new(
            DEPENDENCY_TASKS,
            vec![IndexSpec::asc("update_ts").expire_after(ONE_DAY_SECONDS)],
        ),
        CollectionIndexes::new(
            METRICS,
            vec![
                IndexSpec::asc("create_ts").expire_after(THIRTY_DAYS_SECONDS),
                IndexSpec::asc("node_id"),
                IndexSpec::asc("type"),
            ],
        ),
        CollectionIndexes::new(
            NOTIFICATION_REQUESTS,
            vec![
                IndexSpec::asc("create_ts").expire_after(SEVEN_DAYS_SECONDS),
                IndexSpec::asc("channel_id"),
                IndexSpec::asc("setting_id"),
                IndexSpec::asc("status"),
            ],
        ),
        CollectionIndexes::new(
            DATABASE_METRICS,
            vec![
                IndexSpec::asc("create_ts").expire_after(THIRTY_DAYS_SECONDS),
                IndexSpec::asc("database_id"),
                IndexSpec::asc("type"),
            ],
        ),
    ]
}
