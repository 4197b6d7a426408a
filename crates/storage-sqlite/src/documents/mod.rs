//! SQLite storage implementation for the document store.

mod model;
mod store;

#[cfg(test)]
mod store_tests;

pub use model::DocumentDB;
pub use store::SqliteDocumentStore;
