//! In-memory adapters for board persistence.

mod record_store;

pub use record_store::{InMemoryRecordStore, StoreOperation};
