use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{Bson, Document},
    error::{Error as MongoError, ErrorKind},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::debug;

use crawl_core::{SchedulerError, SchedulerResult};
use crawl_domain::{
    index::{IndexDirection, IndexField, IndexSpec},
    ports::IndexStore,
};

/// 集合不存在时服务端返回的错误码
const NAMESPACE_NOT_FOUND: i32 = 26;

fn is_namespace_not_found(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command) if command.code == NAMESPACE_NOT_FOUND)
}

/// 索引规格转换为驱动的索引模型
pub fn to_index_model(spec: &IndexSpec) -> IndexModel {
    let mut keys = Document::new();
    for field in &spec.keys {
        let direction = match &field.direction {
            IndexDirection::Ascending => Bson::Int32(1),
            IndexDirection::Descending => Bson::Int32(-1),
            IndexDirection::Special(kind) => Bson::String(kind.clone()),
        };
        keys.insert(field.name.clone(), direction);
    }

    let options = IndexOptions::builder()
        .unique(spec.unique.then_some(true))
        .expire_after(spec.expire_after_seconds.map(Duration::from_secs))
        .name(spec.name.clone())
        .build();

    IndexModel::builder().keys(keys).options(options).build()
}

/// 驱动返回的索引模型转换为索引规格
pub fn from_index_model(model: &IndexModel) -> IndexSpec {
    let keys = model
        .keys
        .iter()
        .map(|(name, value)| IndexField {
            name: name.clone(),
            direction: direction_of(value),
        })
        .collect();

    let mut spec = IndexSpec::new(keys);
    if let Some(options) = &model.options {
        spec.unique = options.unique.unwrap_or(false);
        spec.expire_after_seconds = options.expire_after.map(|ttl| ttl.as_secs());
        spec.name = options.name.clone();
    }
    spec
}

fn direction_of(value: &Bson) -> IndexDirection {
    let numeric = match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    };
    match (numeric, value) {
        (Some(v), _) if v < 0.0 => IndexDirection::Descending,
        (Some(_), _) => IndexDirection::Ascending,
        (None, Bson::String(kind)) => IndexDirection::Special(kind.clone()),
        (None, other) => IndexDirection::Special(other.to_string()),
    }
}

/// 基于MongoDB的索引操作
#[derive(Clone)]
pub struct MongoIndexStore {
    database: Database,
}

impl MongoIndexStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl IndexStore for MongoIndexStore {
    async fn list_indexes(&self, collection: &str) -> SchedulerResult<Vec<IndexSpec>> {
        let cursor = match self.collection(collection).list_indexes(None).await {
            Ok(cursor) => cursor,
            // 集合尚未创建时只有隐式主键
            Err(e) if is_namespace_not_found(&e) => {
                debug!("集合 {} 不存在，视为仅有主键索引", collection);
                return Ok(vec![IndexSpec::primary()]);
            }
            Err(e) => return Err(SchedulerError::storage("list_indexes", collection, e)),
        };

        let models: Vec<IndexModel> = cursor
            .try_collect()
            .await
            .map_err(|e| SchedulerError::storage("list_indexes", collection, e))?;

        Ok(models.iter().map(from_index_model).collect())
    }

    async fn create_indexes(
        &self,
        collection: &str,
        indexes: &[IndexSpec],
    ) -> SchedulerResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models: Vec<IndexModel> = indexes.iter().map(to_index_model).collect();
        let result = self
            .collection(collection)
            .create_indexes(models, None)
            .await
            .map_err(|e| SchedulerError::storage("create_indexes", collection, e))?;

        debug!("集合 {} 创建索引: {:?}", collection, result.index_names);
        Ok(())
    }

    async fn drop_indexes_except_primary(&self, collection: &str) -> SchedulerResult<()> {
        match self.collection(collection).drop_indexes(None).await {
            Ok(()) => Ok(()),
            Err(e) if is_namespace_not_found(&e) => Ok(()),
            Err(e) => Err(SchedulerError::storage("drop_indexes", collection, e)),
        }
    }
}
