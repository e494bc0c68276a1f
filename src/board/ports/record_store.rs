//! Data-access port for the shared record store and its change feed.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// A persisted row: field name to JSON value.
pub type Record = Map<String, Value>;

/// Result type for record store operations.
pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Tables the board reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Task rows.
    Tasks,
    /// Append-only activity rows.
    ActivityLogs,
    /// Task comment rows.
    TaskComments,
}

impl Table {
    /// Returns the table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::ActivityLogs => "activity_logs",
            Self::TaskComments => "task_comments",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of field equality conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    conditions: Vec<(String, Value)>,
}

impl RecordFilter {
    /// Creates a filter matching rows whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            conditions: vec![(field.into(), value.into())],
        }
    }

    /// Returns `true` when every condition holds for `record`.
    ///
    /// A missing field compares equal to `null`.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            record.get(field).unwrap_or(&Value::Null) == expected
        })
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    field: String,
    descending: bool,
}

impl OrderBy {
    /// Sorts by `field`, smallest first.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Sorts by `field`, largest first.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Returns the sort field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns `true` for largest-first ordering.
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.descending
    }
}

/// Parameters of a select: optional filter, ordering, and row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    filter: Option<RecordFilter>,
    order_by: Option<OrderBy>,
    limit: Option<usize>,
}

impl SelectQuery {
    /// Selects every row in storage order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the rows returned.
    #[must_use]
    pub fn filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Orders the rows returned.
    #[must_use]
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// Caps the number of rows returned.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the filter, if any.
    #[must_use]
    pub const fn filter_ref(&self) -> Option<&RecordFilter> {
        self.filter.as_ref()
    }

    /// Returns the ordering, if any.
    #[must_use]
    pub const fn order_by_ref(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// Returns the row limit, if any.
    #[must_use]
    pub const fn limit_value(&self) -> Option<usize> {
        self.limit
    }
}

/// Kind of row change carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
    /// Notifications were dropped; anything may have changed.
    Resync,
}

/// Set of change kinds a subscriber wants to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMask {
    insert: bool,
    update: bool,
    delete: bool,
}

impl EventMask {
    /// Every change kind.
    pub const ALL: Self = Self {
        insert: true,
        update: true,
        delete: true,
    };

    /// Inserts only.
    pub const INSERT: Self = Self {
        insert: true,
        update: false,
        delete: false,
    };

    /// Returns `true` when `kind` is selected. Resyncs always pass.
    #[must_use]
    pub const fn contains(self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Insert => self.insert,
            ChangeKind::Update => self.update,
            ChangeKind::Delete => self.delete,
            ChangeKind::Resync => true,
        }
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// "Something in this table changed."
///
/// `record` is a best-effort copy of the affected row; consumers must not
/// rely on it and should re-fetch instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification {
    /// Table that changed.
    pub table: Table,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Affected row, when the store supplies one.
    pub record: Option<Record>,
}

/// Parameters of a change subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeRequest {
    table: Table,
    mask: EventMask,
    filter: Option<RecordFilter>,
}

impl SubscribeRequest {
    /// Subscribes to every change in `table`.
    #[must_use]
    pub const fn new(table: Table) -> Self {
        Self {
            table,
            mask: EventMask::ALL,
            filter: None,
        }
    }

    /// Restricts the change kinds delivered.
    #[must_use]
    pub const fn with_mask(mut self, mask: EventMask) -> Self {
        self.mask = mask;
        self
    }

    /// Restricts delivery to rows matching `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns the subscribed table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }
}

/// Live stream of change notifications. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ChangeSubscription {
    request: SubscribeRequest,
    receiver: broadcast::Receiver<ChangeNotification>,
}

impl ChangeSubscription {
    /// Wraps a broadcast receiver carrying every change in the store.
    #[must_use]
    pub const fn new(
        request: SubscribeRequest,
        receiver: broadcast::Receiver<ChangeNotification>,
    ) -> Self {
        Self { request, receiver }
    }

    /// Returns the subscribed table.
    #[must_use]
    pub const fn table(&self) -> Table {
        self.request.table
    }

    /// Waits for the next matching notification.
    ///
    /// Returns `None` once the store has shut down its change feed. When
    /// the subscriber falls behind, a single [`ChangeKind::Resync`]
    /// notification stands in for everything that was dropped.
    pub async fn next(&mut self) -> Option<ChangeNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if self.accepts(&notification) => return Some(notification),
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {
                    return Some(ChangeNotification {
                        table: self.request.table,
                        kind: ChangeKind::Resync,
                        record: None,
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn accepts(&self, notification: &ChangeNotification) -> bool {
        if notification.table != self.request.table {
            return false;
        }
        if !self.request.mask.contains(notification.kind) {
            return false;
        }
        match (&self.request.filter, &notification.record) {
            (Some(filter), Some(record)) => filter.matches(record),
            _ => true,
        }
    }
}

/// Record store contract consumed by the task store client, the activity
/// recorder, and the comment service.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads rows from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] on transport failure.
    async fn select(&self, table: Table, query: SelectQuery) -> RecordStoreResult<Vec<Record>>;

    /// Inserts rows and returns them as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Rejected`] when a row violates a store
    /// constraint, or [`RecordStoreError::Unavailable`] on transport failure.
    async fn insert(&self, table: Table, records: Vec<Record>) -> RecordStoreResult<Vec<Record>>;

    /// Merges `fields` into every row matching `filter` and returns the
    /// number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Rejected`] or
    /// [`RecordStoreError::Unavailable`].
    async fn update(
        &self,
        table: Table,
        filter: RecordFilter,
        fields: Record,
    ) -> RecordStoreResult<usize>;

    /// Removes every row matching `filter` and returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] on transport failure.
    async fn delete(&self, table: Table, filter: RecordFilter) -> RecordStoreResult<usize>;

    /// Opens a change subscription.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] when the change feed cannot
    /// be reached.
    fn subscribe(&self, request: SubscribeRequest) -> RecordStoreResult<ChangeSubscription>;
}

/// Errors returned by record store implementations.
#[derive(Debug, Clone, Error)]
pub enum RecordStoreError {
    /// Transport or connectivity failure.
    #[error("record store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The store refused the write.
    #[error("record store rejected write to {table}: {reason}")]
    Rejected {
        /// Target table.
        table: Table,
        /// Constraint or validation message.
        reason: String,
    },

    /// A row could not be encoded or decoded.
    #[error("malformed {table} record: {reason}")]
    Malformed {
        /// Source table.
        table: Table,
        /// Decoder message.
        reason: String,
    },
}

impl RecordStoreError {
    /// Wraps a transport error.
    #[must_use]
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Builds a rejection for `table`.
    #[must_use]
    pub fn rejected(table: Table, reason: impl Into<String>) -> Self {
        Self::Rejected {
            table,
            reason: reason.into(),
        }
    }

    /// Builds a malformed-record error for `table`.
    #[must_use]
    pub fn malformed(table: Table, reason: impl fmt::Display) -> Self {
        Self::Malformed {
            table,
            reason: reason.to_string(),
        }
    }
}
