use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::aggregates_model::{
    apply_adjustment, decimal_from_value, total_from_value, AdjustSign, AggregateKind,
    AtomicityMode,
};
use super::aggregates_traits::AggregateServiceTrait;
use crate::errors::Result;
use crate::notifications::{Notification, NotificationHub};
use crate::session::Session;
use crate::store::{DocumentStore, ValueListener};
use crate::utils::format_amount;

/// Maintains the running totals stored as decimal strings.
#[derive(Clone)]
pub struct AggregateService {
    store: Arc<dyn DocumentStore>,
    hub: Arc<NotificationHub>,
    mode: AtomicityMode,
}

impl AggregateService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hub: Arc<NotificationHub>,
        mode: AtomicityMode,
    ) -> Self {
        Self { store, hub, mode }
    }

    pub fn mode(&self) -> AtomicityMode {
        self.mode
    }

    async fn adjust_read_modify_write(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> Result<String> {
        let path = kind.path(session);
        let snapshot = self.store.get(&path).await?;
        let current = snapshot.value().map(decimal_from_value).transpose()?;
        let next = format_amount(apply_adjustment(current, delta, sign)?);
        self.store.set(&path, Value::String(next.clone())).await?;
        Ok(next)
    }

    async fn adjust_atomic(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> Result<String> {
        let path = kind.path(session);
        let snapshot = self
            .store
            .transaction(
                &path,
                Box::new(move |current| {
                    let current = current.as_ref().map(decimal_from_value).transpose()?;
                    let next = apply_adjustment(current, delta, sign)?;
                    Ok(Value::String(format_amount(next)))
                }),
            )
            .await?;
        Ok(snapshot.as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl AggregateServiceTrait for AggregateService {
    async fn adjust(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> Result<String> {
        debug!(
            "Adjusting {} for {}: {:?} {} ({})",
            kind,
            session.user_id(),
            sign,
            delta,
            self.mode
        );
        match self.mode {
            AtomicityMode::ReadModifyWrite => {
                self.adjust_read_modify_write(session, kind, delta, sign)
                    .await
            }
            AtomicityMode::Atomic => self.adjust_atomic(session, kind, delta, sign).await,
        }
    }

    async fn read(&self, session: &Session, kind: AggregateKind) -> Result<Option<String>> {
        let snapshot = self.store.get(&kind.path(session)).await?;
        let total = snapshot.value().and_then(total_from_value);
        self.hub.publish(
            session.user_id(),
            Notification::AggregateChanged {
                kind,
                total: total.clone(),
            },
        );
        Ok(total)
    }

    fn dispatch_adjust(
        &self,
        session: &Session,
        kind: AggregateKind,
        delta: Decimal,
        sign: AdjustSign,
    ) -> JoinHandle<()> {
        let service = self.clone();
        let session = session.clone();
        tokio::spawn(async move {
            if let Err(e) = service.adjust(&session, kind, delta, sign).await {
                warn!(
                    "Dropped {} adjustment for {}: {}",
                    kind,
                    session.user_id(),
                    e
                );
            }
        })
    }

    fn watch(&self, session: &Session, kind: AggregateKind) -> JoinHandle<()> {
        let mut listener = ValueListener::new(self.store.clone(), kind.path(session));
        let hub = self.hub.clone();
        let user_id = session.user_id().clone();
        tokio::spawn(async move {
            while let Some(next) = listener.next().await {
                match next {
                    Ok(snapshot) => hub.publish(
                        &user_id,
                        Notification::AggregateChanged {
                            kind,
                            total: snapshot.value().and_then(total_from_value),
                        },
                    ),
                    Err(e) => warn!("{} listener for {} failed: {}", kind, user_id, e),
                }
            }
            debug!("{} listener for {} closed", kind, user_id);
        })
    }
}
