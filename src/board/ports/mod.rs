//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod record_store;

pub use record_store::{
    ChangeKind, ChangeNotification, ChangeSubscription, EventMask, OrderBy, Record, RecordFilter,
    RecordStore, RecordStoreError, RecordStoreResult, SelectQuery, SubscribeRequest, Table,
};
