#[cfg(test)]
mod tests {
    use crate::aggregates::{
        AdjustSign, AggregateKind, AggregateService, AggregateServiceTrait, AtomicityMode,
    };
    use crate::categories::Category;
    use crate::errors::{Error, Result, ValidationError};
    use crate::notifications::{MockNotificationSink, NotificationHub};
    use crate::session::Session;
    use crate::store::{
        DocumentStore, MemoryDocumentStore, Snapshot, StoreChange, StorePath, TransactionFn,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{broadcast, Barrier};

    /// Holds every read of `gate` until two readers have arrived, so two
    /// adjustments are guaranteed to start from the same value.
    struct GatedStore {
        inner: MemoryDocumentStore,
        gate: StorePath,
        barrier: Barrier,
    }

    #[async_trait]
    impl DocumentStore for GatedStore {
        async fn get(&self, path: &StorePath) -> Result<Snapshot> {
            let snapshot = self.inner.get(path).await?;
            if *path == self.gate {
                self.barrier.wait().await;
            }
            Ok(snapshot)
        }

        async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
            self.inner.set(path, value).await
        }

        async fn transaction(&self, path: &StorePath, update: TransactionFn) -> Result<Snapshot> {
            self.inner.transaction(path, update).await
        }

        fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
            self.inner.subscribe()
        }
    }

    /// Rejects every write, as a store denying permission would.
    struct ReadOnlyStore {
        inner: MemoryDocumentStore,
    }

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn get(&self, path: &StorePath) -> Result<Snapshot> {
            self.inner.get(path).await
        }

        async fn set(&self, _path: &StorePath, _value: Value) -> Result<()> {
            Err(Error::Store("permission denied".to_string()))
        }

        async fn transaction(&self, _path: &StorePath, _update: TransactionFn) -> Result<Snapshot> {
            Err(Error::Store("permission denied".to_string()))
        }

        fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
            self.inner.subscribe()
        }
    }

    fn session() -> Session {
        Session::for_user("u1").unwrap()
    }

    fn service_with(
        store: Arc<dyn DocumentStore>,
        mode: AtomicityMode,
    ) -> (AggregateService, Arc<NotificationHub>, MockNotificationSink) {
        let sink = MockNotificationSink::new();
        let hub = Arc::new(NotificationHub::new(Arc::new(sink.clone())));
        (AggregateService::new(store, hub.clone(), mode), hub, sink)
    }

    fn memory_with_total(total: &str) -> Arc<MemoryDocumentStore> {
        Arc::new(MemoryDocumentStore::with_document(
            json!({"users": {"u1": {"total_budget": total}}}),
        ))
    }

    #[tokio::test]
    async fn test_adjust_absent_total_establishes_it() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (service, _, _) = service_with(store.clone(), AtomicityMode::ReadModifyWrite);

        let written = service
            .adjust(&session(), AggregateKind::TotalBudget, dec!(25.00), AdjustSign::Add)
            .await
            .unwrap();
        assert_eq!(written, "25.00");

        let stored = store
            .get(&StorePath::parse("users/u1/total_budget"))
            .await
            .unwrap();
        assert_eq!(stored.as_str(), Some("25.00"));
    }

    #[tokio::test]
    async fn test_subtract_from_absent_total_keeps_amount() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (service, _, _) = service_with(store, AtomicityMode::ReadModifyWrite);

        let written = service
            .adjust(
                &session(),
                AggregateKind::TransactionsTotal,
                dec!(8.50),
                AdjustSign::Subtract,
            )
            .await
            .unwrap();
        assert_eq!(written, "8.50");
    }

    #[tokio::test]
    async fn test_adjust_subtract_existing_total() {
        for mode in [AtomicityMode::ReadModifyWrite, AtomicityMode::Atomic] {
            let (service, _, _) = service_with(memory_with_total("25.00"), mode);
            let written = service
                .adjust(
                    &session(),
                    AggregateKind::TotalBudget,
                    dec!(10.00),
                    AdjustSign::Subtract,
                )
                .await
                .unwrap();
            assert_eq!(written, "15.00", "mode {}", mode);
        }
    }

    #[tokio::test]
    async fn test_adjust_reads_legacy_spelling() {
        let (service, _, _) = service_with(memory_with_total("25.0"), AtomicityMode::ReadModifyWrite);
        let written = service
            .adjust(&session(), AggregateKind::TotalBudget, dec!(10), AdjustSign::Add)
            .await
            .unwrap();
        assert_eq!(written, "35.00");
    }

    #[tokio::test]
    async fn test_read_modify_write_race_loses_an_update() {
        let session = session();
        let store = Arc::new(GatedStore {
            inner: MemoryDocumentStore::with_document(json!({"users": {"u1": {"total_budget": "0.00"}}})),
            gate: AggregateKind::TotalBudget.path(&session),
            barrier: Barrier::new(2),
        });
        let (service, _, _) = service_with(store.clone(), AtomicityMode::ReadModifyWrite);

        let (first, second) = tokio::join!(
            service.adjust(&session, AggregateKind::TotalBudget, dec!(10.00), AdjustSign::Add),
            service.adjust(&session, AggregateKind::TotalBudget, dec!(5.00), AdjustSign::Add),
        );
        assert_eq!(first.unwrap(), "10.00");
        assert_eq!(second.unwrap(), "5.00");

        let stored = store
            .inner
            .get(&AggregateKind::TotalBudget.path(&session))
            .await
            .unwrap();
        let total = stored.as_str().unwrap();
        assert!(total == "10.00" || total == "5.00", "got {}", total);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_atomic_mode_keeps_every_update() {
        let session = session();
        let store = memory_with_total("0.00");
        let (service, _, _) = service_with(store.clone(), AtomicityMode::Atomic);

        let (first, second) = tokio::join!(
            service.adjust(&session, AggregateKind::TotalBudget, dec!(10.00), AdjustSign::Add),
            service.adjust(&session, AggregateKind::TotalBudget, dec!(5.00), AdjustSign::Add),
        );
        first.unwrap();
        second.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                service.dispatch_adjust(
                    &session,
                    AggregateKind::TotalBudget,
                    dec!(1.00),
                    AdjustSign::Add,
                )
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store
            .get(&AggregateKind::TotalBudget.path(&session))
            .await
            .unwrap();
        assert_eq!(stored.as_str(), Some("35.00"));
    }

    #[tokio::test]
    async fn test_read_publishes_to_slot() {
        let (service, hub, sink) = service_with(memory_with_total("42.00"), AtomicityMode::default());
        let session = session();

        let total = service
            .read(&session, AggregateKind::TotalBudget)
            .await
            .unwrap();
        assert_eq!(total.as_deref(), Some("42.00"));
        assert_eq!(
            hub.slots(session.user_id()).total_budget.latest(),
            Some(Some("42.00".to_string()))
        );

        let absent = service
            .read(&session, AggregateKind::CategoryTotal(Category::Bills))
            .await
            .unwrap();
        assert_eq!(absent, None);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_dropped() {
        let store = Arc::new(ReadOnlyStore {
            inner: MemoryDocumentStore::new(),
        });
        let (service, _, sink) = service_with(store, AtomicityMode::ReadModifyWrite);
        let session = session();

        let typed = service
            .adjust(&session, AggregateKind::TotalBudget, dec!(1.00), AdjustSign::Add)
            .await;
        assert!(matches!(typed, Err(Error::Store(_))));

        service
            .dispatch_adjust(&session, AggregateKind::TotalBudget, dec!(1.00), AdjustSign::Add)
            .await
            .unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_watch_republishes_changes() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (service, hub, _) = service_with(store.clone(), AtomicityMode::ReadModifyWrite);
        let session = session();
        let kind = AggregateKind::CategoryTotal(Category::Groceries);
        let mut rx = hub
            .slots(session.user_id())
            .category_total(Category::Groceries)
            .unwrap()
            .subscribe();

        let handle = service.watch(&session, kind);
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rx.borrow_and_update().clone(), Some(None));

        service
            .adjust(&session, kind, dec!(12.00), AdjustSign::Add)
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            rx.borrow_and_update().clone(),
            Some(Some("12.00".to_string()))
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_adjust_does_not_publish() {
        let (service, _, sink) = service_with(memory_with_total("1.00"), AtomicityMode::Atomic);
        service
            .adjust(&session(), AggregateKind::TotalBudget, dec!(1.00), AdjustSign::Add)
            .await
            .unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_adjustment_fails_without_breaking_the_store() {
        for mode in [AtomicityMode::Atomic, AtomicityMode::ReadModifyWrite] {
            let store = Arc::new(MemoryDocumentStore::new());
            let (service, _, _) = service_with(store.clone(), mode);

            let first = service
                .adjust(&session(), AggregateKind::TotalBudget, Decimal::MAX, AdjustSign::Add)
                .await
                .unwrap();
            let second = service
                .adjust(&session(), AggregateKind::TotalBudget, Decimal::MAX, AdjustSign::Add)
                .await;
            assert!(matches!(
                second,
                Err(Error::Validation(ValidationError::InvalidInput(_)))
            ));

            let stored = store
                .get(&StorePath::parse("users/u1/total_budget"))
                .await
                .unwrap();
            assert_eq!(stored.as_str(), Some(first.as_str()));

            let other = Session::for_user("u2").unwrap();
            assert_eq!(
                service
                    .adjust(&other, AggregateKind::TotalBudget, dec!(5.00), AdjustSign::Add)
                    .await
                    .unwrap(),
                "5.00"
            );
        }
    }
}
