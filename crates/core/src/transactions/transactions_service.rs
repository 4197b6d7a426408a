use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::transactions_model::{NewTransaction, Transaction};
use super::transactions_traits::TransactionServiceTrait;
use crate::aggregates::{AdjustSign, AggregateKind, AggregateServiceTrait};
use crate::constants::{TIMESTAMP_FIELD, TRANSACTIONS_COLLECTION};
use crate::errors::{Error, Result, ValidationError};
use crate::notifications::{AddResult, Notification, NotificationHub};
use crate::records::RecordCollection;
use crate::session::Session;
use crate::store::DocumentStore;
use crate::utils::now_millis;
use crate::validation::validate_transaction_form;

/// Service for recording transactions and keeping the transactions total.
pub struct TransactionService {
    store: Arc<dyn DocumentStore>,
    hub: Arc<NotificationHub>,
    aggregates: Arc<dyn AggregateServiceTrait>,
}

impl TransactionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hub: Arc<NotificationHub>,
        aggregates: Arc<dyn AggregateServiceTrait>,
    ) -> Self {
        Self {
            store,
            hub,
            aggregates,
        }
    }

    fn collection(&self, session: &Session) -> RecordCollection<Transaction> {
        RecordCollection::new(
            self.store.clone(),
            session.root().child(TRANSACTIONS_COLLECTION),
        )
    }

    fn publish_list(&self, session: &Session, transactions: Vec<Transaction>) {
        self.hub.publish(
            session.user_id(),
            Notification::TransactionsLoaded { transactions },
        );
    }

    fn dispatch_total(&self, session: &Session, transaction: &Transaction, sign: AdjustSign) {
        match transaction.amount_decimal() {
            Ok(amount) => {
                self.aggregates.dispatch_adjust(
                    session,
                    AggregateKind::TransactionsTotal,
                    amount,
                    sign,
                );
            }
            Err(e) => warn!(
                "Transaction {} has an unreadable amount: {}",
                transaction.time_stamp, e
            ),
        }
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn load_transactions(&self, session: &Session) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        for stored in self.collection(session).load_all().await? {
            transactions.insert(0, stored.record);
        }
        debug!(
            "Loaded {} transaction(s) for {}",
            transactions.len(),
            session.user_id()
        );
        self.publish_list(session, transactions.clone());
        Ok(transactions)
    }

    fn loaded_transactions(&self, session: &Session) -> Vec<Transaction> {
        self.hub
            .slots(session.user_id())
            .transactions
            .latest()
            .unwrap_or_default()
    }

    async fn add_transaction(
        &self,
        session: &Session,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        let category = validate_transaction_form(&new_transaction)
            .map_err(|errors| Error::Validation(ValidationError::Form(errors)))?;
        let transaction = Transaction {
            category_name: category.category_name().to_string(),
            transaction_name: new_transaction.transaction_name,
            transaction_amount: new_transaction.transaction_amount,
            time_stamp: new_transaction.time_stamp.unwrap_or_else(now_millis),
        };

        if let Err(e) = self.collection(session).append(&transaction).await {
            self.hub.publish(
                session.user_id(),
                Notification::TransactionAdded {
                    result: AddResult::Failed,
                },
            );
            return Err(e);
        }
        self.hub.publish(
            session.user_id(),
            Notification::TransactionAdded {
                result: AddResult::Added(transaction.clone()),
            },
        );

        let mut loaded = self.loaded_transactions(session);
        loaded.insert(0, transaction.clone());
        self.publish_list(session, loaded);

        self.dispatch_total(session, &transaction, AdjustSign::Add);
        Ok(transaction)
    }

    async fn add_all_transactions(
        &self,
        session: &Session,
        transactions: Vec<Transaction>,
    ) -> Result<usize> {
        let results = self.collection(session).append_all(&transactions).await;

        let mut loaded = self.loaded_transactions(session);
        let mut added = 0;
        for (transaction, result) in transactions.into_iter().zip(results) {
            if result.is_ok() {
                self.dispatch_total(session, &transaction, AdjustSign::Add);
                loaded.insert(0, transaction);
                added += 1;
            }
        }
        loaded.sort_by(|a, b| b.time_stamp.cmp(&a.time_stamp));
        self.publish_list(session, loaded);
        Ok(added)
    }

    async fn remove_transactions(
        &self,
        session: &Session,
        transactions: &[Transaction],
    ) -> Result<Vec<Transaction>> {
        let collection = self.collection(session);
        let time_stamps: BTreeSet<i64> = transactions.iter().map(|t| t.time_stamp).collect();
        let outcomes = join_all(time_stamps.iter().map(|ts| {
            let value = json!(ts);
            let collection = collection.clone();
            async move { collection.remove_matching(TIMESTAMP_FIELD, &value).await }
        }))
        .await;

        let mut removed = Vec::new();
        let mut first_error = None;
        for outcome in outcomes {
            // Records deleted before a failed delete still count.
            let outcome = outcome.and_then(|removal| {
                removed.extend(removal.removed.into_iter().map(|stored| stored.record));
                removal.error.map_or(Ok(()), Err)
            });
            if let Err(e) = outcome {
                warn!(
                    "Failed to remove transactions for {}: {}",
                    session.user_id(),
                    e
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        for transaction in &removed {
            self.dispatch_total(session, transaction, AdjustSign::Subtract);
        }
        let mut loaded = self.loaded_transactions(session);
        loaded.retain(|t| !removed.contains(t));
        self.publish_list(session, loaded);

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    async fn add_to_transactions_total(
        &self,
        session: &Session,
        amount: Decimal,
    ) -> Result<String> {
        self.aggregates
            .adjust(session, AggregateKind::TransactionsTotal, amount, AdjustSign::Add)
            .await
    }

    async fn subtract_from_transactions_total(
        &self,
        session: &Session,
        amount: Decimal,
    ) -> Result<String> {
        self.aggregates
            .adjust(
                session,
                AggregateKind::TransactionsTotal,
                amount,
                AdjustSign::Subtract,
            )
            .await
    }

    async fn get_transactions_total(&self, session: &Session) -> Result<Option<String>> {
        self.aggregates
            .read(session, AggregateKind::TransactionsTotal)
            .await
    }

    fn watch_transactions_total(&self, session: &Session) -> JoinHandle<()> {
        self.aggregates
            .watch(session, AggregateKind::TransactionsTotal)
    }
}
