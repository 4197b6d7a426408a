mod record_collection;

pub use record_collection::{RecordCollection, Removal, StoredRecord};
