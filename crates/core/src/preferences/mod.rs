//! Per-identity local preferences.

mod memory_preference_store;
mod preferences_service;
mod preferences_traits;

pub use memory_preference_store::MemoryPreferenceStore;
pub use preferences_service::PreferencesService;
pub use preferences_traits::{PreferenceStore, PreferencesServiceTrait};
