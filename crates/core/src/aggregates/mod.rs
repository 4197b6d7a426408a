//! Running totals: total budget, transactions total and per-category totals.

mod aggregates_model;
mod aggregates_service;
mod aggregates_traits;

#[cfg(test)]
mod aggregates_service_tests;

pub use aggregates_model::{
    apply_adjustment, decimal_from_value, total_from_value, AdjustSign, AggregateKind,
    AtomicityMode,
};
pub use aggregates_service::AggregateService;
pub use aggregates_traits::AggregateServiceTrait;
