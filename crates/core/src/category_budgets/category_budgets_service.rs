use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::category_budgets_model::CategoryBudget;
use super::category_budgets_traits::CategoryBudgetServiceTrait;
use crate::aggregates::{total_from_value, AdjustSign, AggregateKind, AggregateServiceTrait};
use crate::categories::Category;
use crate::constants::{CATEGORIES_COLLECTION, CATEGORY_TOTAL_KEY};
use crate::errors::Result;
use crate::notifications::{Notification, NotificationHub};
use crate::session::Session;
use crate::store::DocumentStore;

pub struct CategoryBudgetService {
    store: Arc<dyn DocumentStore>,
    hub: Arc<NotificationHub>,
    aggregates: Arc<dyn AggregateServiceTrait>,
}

impl CategoryBudgetService {
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
}

#[async_trait]
impl CategoryBudgetServiceTrait for CategoryBudgetService {
    async fn get_category_budgets(&self, session: &Session) -> Result<Vec<CategoryBudget>> {
        let snapshot = self
            .store
            .get(&session.root().child(CATEGORIES_COLLECTION))
            .await?;

        let mut categories = Vec::new();
        for child in snapshot.children() {
            let Some(name) = child.key().map(str::to_string) else {
                continue;
            };
            if Category::from_name(&name).is_none() {
                warn!("Skipping total for unknown category '{}'", name);
                continue;
            }
            if let Some(total) = child
                .child(CATEGORY_TOTAL_KEY)
                .value()
                .and_then(total_from_value)
            {
                categories.push(CategoryBudget {
                    category_name: name,
                    total,
                });
            }
        }
        categories.sort_by_key(|c| Category::from_name(&c.category_name));

        self.hub.publish(
            session.user_id(),
            Notification::CategoryBudgetsLoaded {
                categories: categories.clone(),
            },
        );
        Ok(categories)
    }

    async fn get_category_total(
        &self,
        session: &Session,
        category: Category,
    ) -> Result<Option<String>> {
        self.aggregates
            .read(session, AggregateKind::CategoryTotal(category))
            .await
    }

    async fn add_to_category_total(
        &self,
        session: &Session,
        category: Category,
        amount: Decimal,
    ) -> Result<String> {
        self.aggregates
            .adjust(
                session,
                AggregateKind::CategoryTotal(category),
                amount,
                AdjustSign::Add,
            )
            .await
    }

    async fn subtract_from_category_total(
        &self,
        session: &Session,
        category: Category,
        amount: Decimal,
    ) -> Result<String> {
        self.aggregates
            .adjust(
                session,
                AggregateKind::CategoryTotal(category),
                amount,
                AdjustSign::Subtract,
            )
            .await
    }
}
