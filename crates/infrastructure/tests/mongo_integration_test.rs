#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crawl_core::{DatabaseConfig, SchedulerError};
    use crawl_domain::entities::{nil_node_id, NodeFilter, RunMode, TaskStatus};
    use crawl_domain::index::IndexSpec;
    use crawl_domain::ports::{IndexStore, TaskQueue};
    use crawl_domain::repositories::{NodeRepository, TaskStatRepository};
    use crawl_infrastructure::{IndexReconciler, MongoStore, ReconcileOutcome};
    use crawl_testing_utils::{NodeBuilder, TaskBuilder};
    use mongodb::bson::{doc, Document};
    use mongodb::options::CreateCollectionOptions;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::ContainerAsync;
    use testcontainers_modules::mongo::Mongo;

    struct MongoTestSetup {
        _container: ContainerAsync<Mongo>,
        store: MongoStore,
    }

    impl MongoTestSetup {
        async fn new() -> Self {
            let container = Mongo::default().start().await.unwrap();
            let port = container.get_host_port_ipv4(27017).await.unwrap();
            let config = DatabaseConfig {
                uri: format!("mongodb://127.0.0.1:{port}"),
                database_name: "crawl_scheduler_test".to_string(),
                ..DatabaseConfig::default()
            };
            let store = MongoStore::connect(&config).await.unwrap();
            Self {
                _container: container,
                store,
            }
        }
    }

    #[tokio::test]
    #[ignore = "需要Docker"]
    async fn test_tasks_index_reconcile_against_mongo() {
        let setup = MongoTestSetup::new().await;
        let index_store = Arc::new(setup.store.index_store());

        // 集合尚未创建
        let before = index_store.list_indexes("tasks").await.unwrap();
        assert_eq!(before.len(), 1);
        assert!(before[0].is_primary());

        let desired = vec![
            IndexSpec::asc("spider_id"),
            IndexSpec::asc("status"),
            IndexSpec::asc("node_id"),
            IndexSpec::asc("create_ts").expire_after(2_592_000),
        ];
        let reconciler = IndexReconciler::new(index_store.clone());

        let first = reconciler.reconcile("tasks", &desired).await.unwrap();
        assert_eq!(first, ReconcileOutcome::Rebuilt { created: 4 });

        let live = index_store.list_indexes("tasks").await.unwrap();
        assert_eq!(live.len(), 5);
        let ttl = live.iter().find(|index| index.is_ttl()).unwrap();
        assert_eq!(ttl.expire_after_seconds, Some(2_592_000));

        let second = reconciler.reconcile("tasks", &desired).await.unwrap();
        assert_eq!(second, ReconcileOutcome::Unchanged);
    }

    #[tokio::test]
    #[ignore = "需要Docker"]
    async fn test_enqueue_writes_task_and_stat() {
        let setup = MongoTestSetup::new().await;
        let queue = setup.store.task_queue();
        let stats = setup.store.task_stat_repository();

        let task = TaskBuilder::new()
            .with_node_id(nil_node_id())
            .with_mode(RunMode::Random)
            .build();
        let persisted = queue.enqueue(task, None).await.unwrap();

        assert_eq!(persisted.status, TaskStatus::Pending);
        let stat = stats.get_by_task_id(&persisted.id).await.unwrap().unwrap();
        assert_eq!(stat.id, persisted.id);
    }

    #[tokio::test]
    #[ignore = "需要Docker"]
    async fn test_failed_stat_write_leaves_no_task() {
        let setup = MongoTestSetup::new().await;
        let database = setup.store.database();
        // 校验规则拒绝所有统计记录
        database
            .create_collection(
                "task_stats",
                CreateCollectionOptions::builder()
                    .validator(doc! { "never_present": { "$exists": true } })
                    .build(),
            )
            .await
            .unwrap();

        let result = setup
            .store
            .task_queue()
            .enqueue(TaskBuilder::new().build(), None)
            .await;

        assert!(matches!(result, Err(SchedulerError::Storage { .. })));
        let tasks = database
            .collection::<Document>("tasks")
            .count_documents(None, None)
            .await
            .unwrap();
        assert_eq!(tasks, 0);
    }

    #[tokio::test]
    #[ignore = "需要Docker"]
    async fn test_eligible_node_query() {
        let setup = MongoTestSetup::new().await;
        let nodes = setup
            .store
            .database()
            .collection::<crawl_domain::entities::Node>("nodes");
        let online = NodeBuilder::new().with_key("a").build();
        let offline = NodeBuilder::new().with_key("b").offline().build();
        nodes
            .insert_many(vec![online.clone(), offline], None)
            .await
            .unwrap();

        let ids = setup
            .store
            .node_repository()
            .find_ids(&NodeFilter::eligible())
            .await
            .unwrap();

        assert_eq!(ids, vec![online.id]);
    }
}
