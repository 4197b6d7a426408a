//! Realtime document store: paths, snapshots, listeners and the store trait.

mod listeners;
mod memory_store;
mod store_model;
mod store_path;
mod store_traits;
pub mod tree;

pub use listeners::{ChildListener, ValueListener};
pub use memory_store::{MemoryDocumentStore, CHANGE_FEED_CAPACITY};
pub use store_model::{
    generate_push_key, ChildEvent, ChildEventKind, Snapshot, StoreChange, TransactionFn,
};
pub use store_path::StorePath;
pub use store_traits::DocumentStore;
