#[cfg(test)]
mod tests {
    use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool};
    use crate::documents::SqliteDocumentStore;
    use budgetbook_core::store::{DocumentStore, StorePath, ValueListener};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn create_test_store() -> (Arc<SqliteDocumentStore>, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");

        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let store = Arc::new(SqliteDocumentStore::new(Arc::clone(&pool), writer));
        (store, pool, temp_dir)
    }

    #[tokio::test]
    async fn test_set_and_get_subtree() {
        let (store, _pool, _dir) = create_test_store();
        let user = StorePath::parse("users/u1");
        store
            .set(
                &user,
                json!({"total_budget": "25.00", "budgets": {"k1": {"budgetName": "Rent", "budgetAmount": "25.00"}}}),
            )
            .await
            .unwrap();
        // A sibling user whose path shares the prefix must stay out of u1's subtree.
        store
            .set(&StorePath::parse("users/u10/total_budget"), json!("1.00"))
            .await
            .unwrap();

        let snapshot = store.get(&user).await.unwrap();
        assert_eq!(
            snapshot.into_value(),
            Some(json!({"total_budget": "25.00", "budgets": {"k1": {"budgetName": "Rent", "budgetAmount": "25.00"}}}))
        );
        let leaf = store.get(&user.child("total_budget")).await.unwrap();
        assert_eq!(leaf.as_str(), Some("25.00"));
    }

    #[tokio::test]
    async fn test_set_replaces_subtree_and_scalars_in_the_way() {
        let (store, _pool, _dir) = create_test_store();
        let node = StorePath::parse("users/u1/categories");
        store.set(&node, json!("oops")).await.unwrap();
        store
            .set(&node.child("Bills/total"), json!("10.00"))
            .await
            .unwrap();
        assert_eq!(
            store.get(&node).await.unwrap().into_value(),
            Some(json!({"Bills": {"total": "10.00"}}))
        );

        store.set(&node, json!({"Groceries": {"total": "3.00"}})).await.unwrap();
        assert_eq!(
            store.get(&node).await.unwrap().into_value(),
            Some(json!({"Groceries": {"total": "3.00"}}))
        );

        store.remove(&node).await.unwrap();
        assert!(!store.get(&node).await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_push_and_query_equal_to() {
        let (store, _pool, _dir) = create_test_store();
        let transactions = StorePath::parse("users/u1/transactions");
        for (name, ts) in [("a", 100), ("b", 200), ("c", 100)] {
            store
                .push(&transactions, json!({"transactionName": name, "timeStamp": ts}))
                .await
                .unwrap();
        }

        let matches = store
            .query_equal_to(&transactions, "timeStamp", &json!(100))
            .await
            .unwrap();
        let names: Vec<_> = matches
            .iter()
            .map(|s| s.child("transactionName").as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_transactions_serialize_through_writer() {
        let (store, _pool, _dir) = create_test_store();
        let counter = StorePath::parse("users/u1/total_budget");

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let store = store.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    store
                        .transaction(
                            &counter,
                            Box::new(|current| {
                                let n = current.as_ref().and_then(Value::as_i64).unwrap_or(0);
                                Ok(json!(n + 1))
                            }),
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get(&counter).await.unwrap().into_value(), Some(json!(25)));
    }

    #[tokio::test]
    async fn test_failed_transaction_writes_nothing() {
        let (store, _pool, _dir) = create_test_store();
        let path = StorePath::parse("users/u1/total_budget");
        store.set(&path, json!("5.00")).await.unwrap();

        let result = store
            .transaction(
                &path,
                Box::new(|_| {
                    Err(budgetbook_core::Error::Unexpected(
                        "update refused".to_string(),
                    ))
                }),
            )
            .await;
        assert!(matches!(result, Err(budgetbook_core::Error::Unexpected(_))));
        assert_eq!(store.get(&path).await.unwrap().as_str(), Some("5.00"));
    }

    #[tokio::test]
    async fn test_value_listener_sees_committed_writes() {
        let (store, _pool, _dir) = create_test_store();
        let path = StorePath::parse("users/u1/transactions/transactions_total");
        let mut listener = ValueListener::new(store.clone(), path.clone());

        let first = listener.next().await.unwrap().unwrap();
        assert!(!first.exists());

        store.set(&path, json!("12.00")).await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(2), listener.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.as_str(), Some("12.00"));
    }

    #[tokio::test]
    async fn test_data_survives_new_store_instance() {
        let (store, pool, _dir) = create_test_store();
        let path = StorePath::parse("users/u1/total_budget");
        store.set(&path, json!("40.00")).await.unwrap();

        let reopened = SqliteDocumentStore::new(Arc::clone(&pool), spawn_writer((*pool).clone()));
        assert_eq!(reopened.get(&path).await.unwrap().as_str(), Some("40.00"));
    }
}
