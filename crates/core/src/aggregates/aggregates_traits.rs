use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;

use super::aggregates_model::{AdjustSign, AggregateKind};
use crate::errors::Result;
use crate::session::Session;

/// Trait for running-total operations
#[async_trait]
pub trait AggregateServiceTrait: Send + Sync {
    /// Applies `sign * delta` to the total and returns the value written.
    async fn adjust(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> Result<String>;

    /// Single-shot read; `None` when the total has never been written.
    /// The value is also published to the user's slot.
    async fn read(&self, session: &Session, kind: AggregateKind) -> Result<Option<String>>;

    /// Runs [`adjust`](Self::adjust) as a detached task. Failures are logged
    /// and nothing is published.
    fn dispatch_adjust(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> JoinHandle<()>;

    /// Republishes every change of the total until the handle is aborted.
    fn watch(&self, session: &Session, kind: AggregateKind) -> JoinHandle<()>;
}
