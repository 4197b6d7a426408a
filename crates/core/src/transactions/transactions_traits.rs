use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;

use super::transactions_model::{NewTransaction, Transaction};
use crate::errors::Result;
use crate::session::Session;

/// Trait for transaction service operations
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Reads the whole collection, most recent first, and publishes it.
    async fn load_transactions(&self, session: &Session) -> Result<Vec<Transaction>>;

    fn loaded_transactions(&self, session: &Session) -> Vec<Transaction>;

    async fn add_transaction(
        &self,
        session: &Session,
        new_transaction: NewTransaction,
    ) -> Result<Transaction>;

    /// Re-appends previously removed transactions. Returns how many were
    /// written; individual failures are logged.
    async fn add_all_transactions(
        &self,
        session: &Session,
        transactions: Vec<Transaction>,
    ) -> Result<usize>;

    /// Removes every stored transaction sharing a timestamp with one of
    /// `transactions`, and returns what was removed.
    async fn remove_transactions(
        &self,
        session: &Session,
        transactions: &[Transaction],
    ) -> Result<Vec<Transaction>>;

    async fn add_to_transactions_total(&self, session: &Session, amount: Decimal)
        -> Result<String>;

    async fn subtract_from_transactions_total(
        &self,
        session: &Session,
        amount: Decimal,
    ) -> Result<String>;

    async fn get_transactions_total(&self, session: &Session) -> Result<Option<String>>;

    fn watch_transactions_total(&self, session: &Session) -> JoinHandle<()>;
}
