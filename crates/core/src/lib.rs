//! Budgetbook Core - Domain entities, services, and traits.
//!
//! This crate contains the expense-tracking logic for Budgetbook: budgets,
//! transactions and the running totals derived from them, kept in a
//! path-addressed document store. It is storage-agnostic; the
//! `storage-sqlite` crate implements the store traits for SQLite.

pub mod aggregates;
pub mod budgets;
pub mod categories;
pub mod category_budgets;
pub mod constants;
pub mod errors;
pub mod notifications;
pub mod preferences;
pub mod records;
pub mod session;
pub mod store;
pub mod transactions;
pub mod utils;
pub mod validation;

pub use session::{Session, UserId};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
