//! 索引规格与差异比较
//!
//! 索引对齐只比较键模式签名：唯一性和过期时间不参与比较，
//! 仅调整TTL秒数不会触发重建。

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 主键字段，主键索引永远不会被删除或参与比较
pub const PRIMARY_KEY_FIELD: &str = "_id";

/// 索引字段方向
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexDirection {
    Ascending,
    Descending,
    /// 非排序类索引，如 "text"、"2dsphere"、"hashed"
    Special(String),
}

impl IndexDirection {
    fn signature_part(&self) -> String {
        match self {
            IndexDirection::Ascending => "1".to_string(),
            IndexDirection::Descending => "-1".to_string(),
            IndexDirection::Special(kind) => kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexField {
    pub name: String,
    pub direction: IndexDirection,
}

impl IndexField {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: IndexDirection::Ascending,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: IndexDirection::Descending,
        }
    }
}

/// 键模式的规范化签名，字段顺序有意义
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSignature(String);

impl IndexSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 索引规格：有序键模式 + 唯一性 + 可选的过期秒数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub keys: Vec<IndexField>,
    pub unique: bool,
    pub expire_after_seconds: Option<u64>,
    /// 存储引擎中的索引名，期望规格一般留空由引擎生成
    pub name: Option<String>,
}

impl IndexSpec {
    pub fn new(keys: Vec<IndexField>) -> Self {
        Self {
            keys,
            unique: false,
            expire_after_seconds: None,
            name: None,
        }
    }

    /// 单字段升序索引
    pub fn asc(field: &str) -> Self {
        Self::new(vec![IndexField::asc(field)])
    }

    pub fn desc(field: &str) -> Self {
        Self::new(vec![IndexField::desc(field)])
    }

    /// 多字段升序复合索引
    pub fn compound(fields: &[&str]) -> Self {
        Self::new(fields.iter().map(|f| IndexField::asc(*f)).collect())
    }

    pub fn primary() -> Self {
        Self::asc(PRIMARY_KEY_FIELD).named("_id_")
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn expire_after(mut self, seconds: u64) -> Self {
        self.expire_after_seconds = Some(seconds);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.keys.as_slice(), [field]
            if field.name == PRIMARY_KEY_FIELD && field.direction == IndexDirection::Ascending)
    }

    pub fn is_ttl(&self) -> bool {
        self.expire_after_seconds.is_some()
    }

    /// 规范化签名，例如 `{type:1,node_id:1,name:1}`
    pub fn signature(&self) -> IndexSignature {
        let inner: Vec<String> = self
            .keys
            .iter()
            .map(|field| format!("{}:{}", field.name, field.direction.signature_part()))
            .collect();
        IndexSignature(format!("{{{}}}", inner.join(",")))
    }
}

/// 现有索引与期望索引的差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    /// 期望存在但当前缺失的签名
    pub missing: Vec<IndexSignature>,
    /// 当前存在但不在期望集合中的签名（不单独触发重建）
    pub unexpected: Vec<IndexSignature>,
}

impl IndexDiff {
    pub fn needs_rebuild(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// 比较现有索引和期望索引，主键索引不参与比较
pub fn diff_indexes(existing: &[IndexSpec], desired: &[IndexSpec]) -> IndexDiff {
    let existing_signatures: HashSet<IndexSignature> = existing
        .iter()
        .filter(|index| !index.is_primary())
        .map(IndexSpec::signature)
        .collect();
    let desired_signatures: HashSet<IndexSignature> = desired
        .iter()
        .filter(|index| !index.is_primary())
        .map(IndexSpec::signature)
        .collect();

    let mut missing = Vec::new();
    for index in desired.iter().filter(|index| !index.is_primary()) {
        let signature = index.signature();
        if !existing_signatures.contains(&signature) && !missing.contains(&signature) {
            missing.push(signature);
        }
    }

    let unexpected = existing
        .iter()
        .filter(|index| !index.is_primary())
        .map(IndexSpec::signature)
        .filter(|signature| !desired_signatures.contains(signature))
        .collect();

    IndexDiff {
        missing,
        unexpected,
    }
}

pub fn needs_rebuild(existing: &[IndexSpec], desired: &[IndexSpec]) -> bool {
    diff_indexes(existing, desired).needs_rebuild()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_keeps_field_order() {
        let a = IndexSpec::compound(&["user_id", "role_id"]);
        let b = IndexSpec::compound(&["role_id", "user_id"]);
        assert_eq!(a.signature().as_str(), "{user_id:1,role_id:1}");
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_ignores_options() {
        let plain = IndexSpec::asc("create_ts");
        let ttl = IndexSpec::asc("create_ts").expire_after(86400).unique();
        assert_eq!(plain.signature(), ttl.signature());
    }

    #[test]
    fn test_signature_distinguishes_direction() {
        let asc = IndexSpec::new(vec![IndexField::asc("create_ts")]);
        let desc = IndexSpec::new(vec![IndexField::desc("create_ts")]);
        let text = IndexSpec::new(vec![IndexField {
            name: "create_ts".to_string(),
            direction: IndexDirection::Special("text".to_string()),
        }]);
        assert_ne!(asc.signature(), desc.signature());
        assert_eq!(text.signature().as_str(), "{create_ts:text}");
    }

    #[test]
    fn test_empty_collection_needs_rebuild() {
        let existing = vec![IndexSpec::primary()];
        let desired = vec![IndexSpec::asc("spider_id"), IndexSpec::asc("status")];
        let diff = diff_indexes(&existing, &desired);
        assert!(diff.needs_rebuild());
        assert_eq!(diff.missing.len(), 2);
        assert!(diff.unexpected.is_empty());
    }

    #[test]
    fn test_matching_indexes_need_no_rebuild() {
        let desired = vec![IndexSpec::asc("spider_id"), IndexSpec::asc("status")];
        let mut existing = vec![IndexSpec::primary()];
        existing.extend(desired.iter().cloned().map(|i| i.named("generated")));
        assert!(!needs_rebuild(&existing, &desired));
    }

    #[test]
    fn test_extra_live_index_is_reported_but_not_rebuilt() {
        let desired = vec![IndexSpec::asc("spider_id")];
        let existing = vec![
            IndexSpec::primary(),
            IndexSpec::asc("spider_id"),
            IndexSpec::asc("legacy_field"),
        ];
        let diff = diff_indexes(&existing, &desired);
        assert!(!diff.needs_rebuild());
        assert_eq!(diff.unexpected.len(), 1);
        assert_eq!(diff.unexpected[0].as_str(), "{legacy_field:1}");
    }

    #[test]
    fn test_ttl_value_change_is_not_detected() {
        // 只修改过期时间不触发重建
        let existing = vec![
            IndexSpec::primary(),
            IndexSpec::asc("create_ts").expire_after(30 * 24 * 3600),
        ];
        let desired = vec![IndexSpec::asc("create_ts").expire_after(7 * 24 * 3600)];
        assert!(!needs_rebuild(&existing, &desired));
    }

    #[test]
    fn test_uniqueness_change_is_not_detected() {
        let existing = vec![IndexSpec::primary(), IndexSpec::asc("key")];
        let desired = vec![IndexSpec::asc("key").unique()];
        assert!(!needs_rebuild(&existing, &desired));
    }

    #[test]
    fn test_primary_index_is_excluded_from_both_sides() {
        let desired = vec![IndexSpec::primary()];
        let diff = diff_indexes(&[], &desired);
        assert!(!diff.needs_rebuild());

        let diff = diff_indexes(&[IndexSpec::primary()], &[]);
        assert!(!diff.needs_rebuild());
        assert!(diff.unexpected.is_empty());
    }

    #[test]
    fn test_duplicate_desired_reported_once() {
        let desired = vec![IndexSpec::asc("name"), IndexSpec::asc("name").unique()];
        let diff = diff_indexes(&[], &desired);
        assert_eq!(diff.missing.len(), 1);
    }
}
