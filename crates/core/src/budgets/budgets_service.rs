use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::budgets_model::{Budget, MyBudget, NewBudget};
use super::budgets_traits::BudgetServiceTrait;
use crate::aggregates::{AdjustSign, AggregateKind, AggregateServiceTrait};
use crate::categories::Category;
use crate::constants::{BUDGETS_COLLECTION, BUDGET_NAME_FIELD, TOTAL_BUDGET_PREF};
use crate::errors::{Error, Result, ValidationError};
use crate::notifications::{AddResult, Notification, NotificationHub};
use crate::preferences::PreferencesServiceTrait;
use crate::records::{RecordCollection, StoredRecord};
use crate::session::Session;
use crate::store::{ChildEventKind, ChildListener, DocumentStore};
use crate::utils::parse_amount;
use crate::validation::validate_budget_form;

/// Service for managing budgets and the totals derived from them.
#[derive(Clone)]
pub struct BudgetService {
    store: Arc<dyn DocumentStore>,
    hub: Arc<NotificationHub>,
    aggregates: Arc<dyn AggregateServiceTrait>,
    preferences: Arc<dyn PreferencesServiceTrait>,
}

impl BudgetService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        hub: Arc<NotificationHub>,
        aggregates: Arc<dyn AggregateServiceTrait>,
        preferences: Arc<dyn PreferencesServiceTrait>,
    ) -> Self {
        Self {
            store,
            hub,
            aggregates,
            preferences,
        }
    }

    fn collection(&self, session: &Session) -> RecordCollection<Budget> {
        RecordCollection::new(
            self.store.clone(),
            session.root().child(BUDGETS_COLLECTION),
        )
    }

    fn publish_list(&self, session: &Session, budgets: Vec<MyBudget>) {
        self.hub
            .publish(session.user_id(), Notification::BudgetsLoaded { budgets });
    }

    /// Applies `delta` to the device-cached total. Cache failures only log.
    async fn update_cached_total(&self, session: &Session, delta: Decimal, sign: AdjustSign) {
        let delta = delta.to_f64().unwrap_or_default();
        let result = match self.preferences.read_float(session, TOTAL_BUDGET_PREF) {
            Ok(cached) => {
                let next = match sign {
                    AdjustSign::Add => cached + delta,
                    AdjustSign::Subtract => cached - delta,
                };
                self.preferences
                    .write_float(session, TOTAL_BUDGET_PREF, next)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(
                "Failed to update cached total budget for {}: {}",
                session.user_id(),
                e
            );
        }
    }

    fn dispatch_totals(
        &self,
        session: &Session,
        category: Category,
        amount: Decimal,
        sign: AdjustSign,
    ) {
        self.aggregates
            .dispatch_adjust(session, AggregateKind::TotalBudget, amount, sign);
        self.aggregates.dispatch_adjust(
            session,
            AggregateKind::CategoryTotal(category),
            amount,
            sign,
        );
    }
}

fn to_my_budget(stored: StoredRecord<Budget>) -> Option<MyBudget> {
    let StoredRecord { key, record } = stored;
    let category_name = record.category_name.clone();
    let budget = MyBudget::from_stored(key.clone(), record);
    if budget.is_none() {
        warn!(
            "Skipping budget {} with unknown category '{}'",
            key, category_name
        );
    }
    budget
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    async fn load_budgets(&self, session: &Session) -> Result<Vec<MyBudget>> {
        let budgets: Vec<MyBudget> = self
            .collection(session)
            .load_all()
            .await?
            .into_iter()
            .filter_map(to_my_budget)
            .collect();
        debug!("Loaded {} budget(s) for {}", budgets.len(), session.user_id());
        self.publish_list(session, budgets.clone());
        Ok(budgets)
    }

    fn loaded_budgets(&self, session: &Session) -> Vec<MyBudget> {
        self.hub
            .slots(session.user_id())
            .budgets
            .latest()
            .unwrap_or_default()
    }

    async fn add_budget(&self, session: &Session, new_budget: NewBudget) -> Result<MyBudget> {
        let mut loaded = self.loaded_budgets(session);
        let category = validate_budget_form(&new_budget, &loaded)
            .map_err(|errors| Error::Validation(ValidationError::Form(errors)))?;
        let amount = parse_amount(&new_budget.budget_amount)?;

        let budget = Budget {
            category_name: category.category_name().to_string(),
            budget_name: new_budget.budget_name,
            budget_amount: new_budget.budget_amount,
        };

        let key = match self.collection(session).append(&budget).await {
            Ok(key) => key,
            Err(e) => {
                self.hub.publish(
                    session.user_id(),
                    Notification::BudgetAdded {
                        result: AddResult::Failed,
                    },
                );
                return Err(e);
            }
        };
        self.hub.publish(
            session.user_id(),
            Notification::BudgetAdded {
                result: AddResult::Added(budget.clone()),
            },
        );

        let my_budget = MyBudget {
            id: key,
            category,
            budget_name: budget.budget_name,
            budget_amount: budget.budget_amount,
        };
        loaded.insert(0, my_budget.clone());
        self.publish_list(session, loaded);

        self.update_cached_total(session, amount, AdjustSign::Add).await;
        self.dispatch_totals(session, category, amount, AdjustSign::Add);
        Ok(my_budget)
    }

    async fn remove_budget(&self, session: &Session, budget_name: &str) -> Result<Vec<Budget>> {
        let removal = self
            .collection(session)
            .remove_matching(BUDGET_NAME_FIELD, &json!(budget_name))
            .await?;

        // Only what was actually deleted leaves the list and the totals.
        let mut loaded = self.loaded_budgets(session);
        loaded.retain(|budget| !removal.removed.iter().any(|r| r.key == budget.id));
        self.publish_list(session, loaded);

        for StoredRecord { key, record } in &removal.removed {
            let (Some(category), Ok(amount)) = (record.category(), record.amount_decimal()) else {
                warn!("Removed budget {} has no usable category or amount", key);
                continue;
            };
            self.update_cached_total(session, amount, AdjustSign::Subtract)
                .await;
            self.dispatch_totals(session, category, amount, AdjustSign::Subtract);
        }
        Ok(removal
            .into_result()?
            .into_iter()
            .map(|stored| stored.record)
            .collect())
    }

    async fn get_total_budget(&self, session: &Session) -> Result<Option<String>> {
        self.aggregates
            .read(session, AggregateKind::TotalBudget)
            .await
    }

    fn watch_total_budget(&self, session: &Session) -> JoinHandle<()> {
        self.aggregates.watch(session, AggregateKind::TotalBudget)
    }

    fn watch_budgets(&self, session: &Session) -> JoinHandle<()> {
        let service = self.clone();
        let session = session.clone();
        let mut listener = ChildListener::new(
            self.store.clone(),
            session.root().child(BUDGETS_COLLECTION),
        );
        tokio::spawn(async move {
            if let Err(e) = service.load_budgets(&session).await {
                warn!("Initial budget load for {} failed: {}", session.user_id(), e);
            }
            let collection = service.collection(&session);
            while let Some(next) = listener.next().await {
                let event = match next {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Budget listener for {} failed: {}", session.user_id(), e);
                        continue;
                    }
                };
                let mut loaded = service.loaded_budgets(&session);
                let Some(key) = event.snapshot.key().map(str::to_string) else {
                    continue;
                };
                let changed = match event.kind {
                    ChildEventKind::Removed => {
                        let before = loaded.len();
                        loaded.retain(|budget| budget.id != key);
                        loaded.len() != before
                    }
                    ChildEventKind::Added | ChildEventKind::Changed => {
                        match collection.decode(&event.snapshot).and_then(to_my_budget) {
                            Some(budget) => match loaded.iter_mut().find(|b| b.id == key) {
                                Some(existing) if *existing == budget => false,
                                Some(existing) => {
                                    *existing = budget;
                                    true
                                }
                                None => {
                                    loaded.insert(0, budget);
                                    true
                                }
                            },
                            None => false,
                        }
                    }
                };
                if changed {
                    service.publish_list(&session, loaded);
                }
            }
        })
    }
}
