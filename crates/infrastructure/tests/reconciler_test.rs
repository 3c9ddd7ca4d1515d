#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crawl_domain::index::{IndexField, IndexSpec};
    use crawl_infrastructure::{
        index_catalog, CollectionIndexes, IndexReconciler, ReconcileOutcome,
    };
    use crawl_testing_utils::{IndexOperation, MockIndexStore};

    fn reconciler(store: &MockIndexStore) -> IndexReconciler {
        IndexReconciler::new(Arc::new(store.clone()))
    }

    fn tasks_desired() -> Vec<IndexSpec> {
        vec![
            IndexSpec::asc("spider_id"),
            IndexSpec::asc("status"),
            IndexSpec::asc("node_id"),
            IndexSpec::asc("create_ts").expire_after(2_592_000),
        ]
    }

    fn signatures(indexes: &[IndexSpec]) -> Vec<String> {
        let mut signatures: Vec<String> = indexes
            .iter()
            .filter(|index| !index.is_primary())
            .map(|index| index.signature().to_string())
            .collect();
        signatures.sort();
        signatures
    }

    #[tokio::test]
    async fn test_tasks_reconcile_on_empty_collection() {
        let store = MockIndexStore::new();
        assert_eq!(store.indexes("tasks"), vec![IndexSpec::primary()]);

        let outcome = reconciler(&store)
            .reconcile("tasks", &tasks_desired())
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Rebuilt { created: 4 });
        let live = store.indexes("tasks");
        assert_eq!(live.len(), 5);
        assert!(live.iter().any(IndexSpec::is_primary));
        assert_eq!(signatures(&live), signatures(&tasks_desired()));

        let ttl = live
            .iter()
            .find(|index| index.keys == vec![IndexField::asc("create_ts")])
            .unwrap();
        assert_eq!(ttl.expire_after_seconds, Some(2_592_000));
    }

    #[tokio::test]
    async fn test_second_reconcile_is_a_no_op() {
        let store = MockIndexStore::new();
        let reconciler = reconciler(&store);

        reconciler.reconcile("tasks", &tasks_desired()).await.unwrap();
        let mutations = store.mutation_count();

        let outcome = reconciler.reconcile("tasks", &tasks_desired()).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(store.mutation_count(), mutations);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_divergent_collection_converges_and_drops_stale_indexes() {
        let store = MockIndexStore::new();
        store.seed(
            "tasks",
            vec![IndexSpec::asc("spider_id"), IndexSpec::asc("legacy_field")],
        );

        let outcome = reconciler(&store)
            .reconcile("tasks", &tasks_desired())
            .await
            .unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Rebuilt { .. }));
        assert_eq!(store.drop_calls(), 1);
        assert_eq!(store.create_calls(), 1);
        let live = store.indexes("tasks");
        assert_eq!(signatures(&live), signatures(&tasks_desired()));
        assert!(live.iter().any(IndexSpec::is_primary));
    }

    #[tokio::test]
    async fn test_extra_indexes_alone_do_not_trigger_rebuild() {
        let store = MockIndexStore::new();
        let mut seeded = tasks_desired();
        seeded.push(IndexSpec::asc("legacy_field"));
        store.seed("tasks", seeded);

        let outcome = reconciler(&store)
            .reconcile("tasks", &tasks_desired())
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_ttl_only_change_is_not_detected() {
        let store = MockIndexStore::new();
        store.seed(
            "metrics",
            vec![IndexSpec::asc("create_ts").expire_after(2_592_000)],
        );

        // 保留期从30天缩短为7天，键模式不变
        let outcome = reconciler(&store)
            .reconcile(
                "metrics",
                &[IndexSpec::asc("create_ts").expire_after(604_800)],
            )
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(store.mutation_count(), 0);
        let live = store.indexes("metrics");
        let ttl = live.iter().find(|index| index.is_ttl()).unwrap();
        assert_eq!(ttl.expire_after_seconds, Some(2_592_000));
    }

    #[tokio::test]
    async fn test_rebuild_avoids_option_conflicts() {
        let store = MockIndexStore::new();
        // 已有同键模式但非唯一的索引，缺失另一个索引触发重建
        store.seed("settings", vec![IndexSpec::asc("key")]);

        let desired = vec![IndexSpec::asc("key").unique(), IndexSpec::asc("name")];
        reconciler(&store).reconcile("settings", &desired).await.unwrap();

        let key_index = store
            .indexes("settings")
            .into_iter()
            .find(|index| index.keys == vec![IndexField::asc("key")])
            .unwrap();
        assert!(key_index.unique);
    }

    #[tokio::test]
    async fn test_list_failure_surfaces_without_mutation() {
        let store = MockIndexStore::new();
        store.fail_on("tasks", IndexOperation::List);

        let result = reconciler(&store).reconcile("tasks", &tasks_desired()).await;

        assert!(result.is_err());
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_on_one_collection_does_not_stop_the_pass() {
        let store = MockIndexStore::new();
        store.fail_on("spiders", IndexOperation::Create);
        let catalog = vec![
            CollectionIndexes {
                collection: "nodes",
                indexes: vec![IndexSpec::asc("key")],
            },
            CollectionIndexes {
                collection: "spiders",
                indexes: vec![IndexSpec::asc("name")],
            },
            CollectionIndexes {
                collection: "tasks",
                indexes: tasks_desired(),
            },
        ];

        let report = reconciler(&store).reconcile_all(&catalog).await;

        assert!(!report.is_success());
        assert_eq!(report.rebuilt(), vec!["nodes", "tasks"]);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "spiders");
        assert_eq!(signatures(&store.indexes("tasks")), signatures(&tasks_desired()));
    }

    #[tokio::test]
    async fn test_list_and_drop_failures_are_isolated() {
        let store = MockIndexStore::new();
        store.fail_on("nodes", IndexOperation::List);
        store.fail_on("spiders", IndexOperation::Drop);
        let catalog = vec![
            CollectionIndexes {
                collection: "nodes",
                indexes: vec![IndexSpec::asc("key")],
            },
            CollectionIndexes {
                collection: "spiders",
                indexes: vec![IndexSpec::asc("name")],
            },
            CollectionIndexes {
                collection: "tasks",
                indexes: tasks_desired(),
            },
        ];

        let report = reconciler(&store).reconcile_all(&catalog).await;

        assert_eq!(report.rebuilt(), vec!["tasks"]);
        let failed: Vec<&str> = report.failed().iter().map(|(name, _)| *name).collect();
        assert_eq!(failed, vec!["nodes", "spiders"]);
        assert_eq!(signatures(&store.indexes("tasks")), signatures(&tasks_desired()));
        // 删除失败时不会继续创建
        assert_eq!(store.indexes("spiders"), vec![IndexSpec::primary()]);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_collections_processed_in_declaration_order() {
        let store = MockIndexStore::new();
        let catalog = index_catalog();

        let report = reconciler(&store).reconcile_all(&catalog).await;

        let processed: Vec<&str> = report
            .collections
            .iter()
            .map(|r| r.collection.as_str())
            .collect();
        let declared: Vec<&str> = catalog.iter().map(|e| e.collection).collect();
        assert_eq!(processed, declared);
        assert!(report.is_success());
        assert_eq!(report.rebuilt().len(), catalog.len());
    }

    #[tokio::test]
    async fn test_full_catalog_is_idempotent() {
        let store = MockIndexStore::new();
        let reconciler = reconciler(&store);
        let catalog = index_catalog();

        reconciler.reconcile_all(&catalog).await;
        let mutations = store.mutation_count();
        let report = reconciler.reconcile_all(&catalog).await;

        assert_eq!(store.mutation_count(), mutations);
        assert_eq!(report.unchanged().len(), catalog.len());
    }
}
