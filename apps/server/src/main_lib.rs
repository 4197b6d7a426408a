use std::sync::Arc;

use crate::{config::Config, events::EventBus};
use budgetbook_core::{
    aggregates::{AggregateService, AggregateServiceTrait},
    budgets::{BudgetService, BudgetServiceTrait},
    category_budgets::{CategoryBudgetService, CategoryBudgetServiceTrait},
    notifications::NotificationHub,
    preferences::{PreferencesService, PreferencesServiceTrait},
    store::DocumentStore,
    transactions::{TransactionService, TransactionServiceTrait},
};
use budgetbook_storage_sqlite::{db, PreferenceRepository, SqliteDocumentStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub category_budget_service: Arc<dyn CategoryBudgetServiceTrait>,
    pub preferences_service: Arc<dyn PreferencesServiceTrait>,
    pub hub: Arc<NotificationHub>,
    pub event_bus: EventBus,
}

pub fn init_tracing() {
    let log_format = std::env::var("BB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    // Every hub notification is also forwarded to SSE clients.
    let event_bus = EventBus::new(256);
    let hub = Arc::new(NotificationHub::new(Arc::new(event_bus.clone())));

    let store: Arc<dyn DocumentStore> =
        Arc::new(SqliteDocumentStore::new(pool.clone(), writer.clone()));
    let preference_repo = Arc::new(PreferenceRepository::new(pool.clone(), writer.clone()));
    let preferences_service: Arc<dyn PreferencesServiceTrait> =
        Arc::new(PreferencesService::new(preference_repo));

    tracing::info!("Aggregate adjustments use {} mode", config.aggregate_mode);
    let aggregate_service: Arc<dyn AggregateServiceTrait> = Arc::new(AggregateService::new(
        store.clone(),
        hub.clone(),
        config.aggregate_mode,
    ));

    let budget_service = Arc::new(BudgetService::new(
        store.clone(),
        hub.clone(),
        aggregate_service.clone(),
        preferences_service.clone(),
    ));
    let transaction_service = Arc::new(TransactionService::new(
        store.clone(),
        hub.clone(),
        aggregate_service.clone(),
    ));
    let category_budget_service = Arc::new(CategoryBudgetService::new(
        store.clone(),
        hub.clone(),
        aggregate_service.clone(),
    ));

    Ok(Arc::new(AppState {
        budget_service,
        transaction_service,
        category_budget_service,
        preferences_service,
        hub,
        event_bus,
    }))
}
