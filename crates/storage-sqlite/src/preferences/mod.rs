//! SQLite storage implementation for preferences.

mod model;
mod repository;

pub use model::PreferenceDB;
pub use repository::PreferenceRepository;

// Re-export trait from core for convenience
pub use budgetbook_core::preferences::PreferenceStore;
