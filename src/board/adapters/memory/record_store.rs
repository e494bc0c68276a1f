//! In-memory record store with a broadcast change feed.

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::trace;

use crate::board::ports::{
    ChangeKind, ChangeNotification, ChangeSubscription, Record, RecordFilter, RecordStore,
    RecordStoreError, RecordStoreResult, SelectQuery, SubscribeRequest, Table,
};

const CHANGE_FEED_CAPACITY: usize = 256;

/// Record store operations that can be counted or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// `select`.
    Select,
    /// `insert`.
    Insert,
    /// `update`.
    Update,
    /// `delete`.
    Delete,
    /// `subscribe`.
    Subscribe,
}

impl StoreOperation {
    /// Returns the operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe in-memory record store.
///
/// Clones share tables and the change feed. Every mutation broadcasts one
/// notification per affected row to all live subscriptions.
#[derive(Debug, Clone)]
pub struct InMemoryRecordStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    changes: broadcast::Sender<ChangeNotification>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tables: HashMap<Table, Vec<StoredRow>>,
    next_sequence: u64,
    failures: HashSet<(StoreOperation, Table)>,
    calls: HashMap<(StoreOperation, Table), usize>,
}

#[derive(Debug, Clone)]
struct StoredRow {
    sequence: u64,
    record: Record,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(InMemoryStoreState::default())),
            changes,
        }
    }

    /// Makes every subsequent `operation` on `table` fail as unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] if the state lock is
    /// poisoned.
    pub fn fail_operation(&self, operation: StoreOperation, table: Table) -> RecordStoreResult<()> {
        self.write_state()?.failures.insert((operation, table));
        Ok(())
    }

    /// Removes every injected failure.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] if the state lock is
    /// poisoned.
    pub fn clear_failures(&self) -> RecordStoreResult<()> {
        self.write_state()?.failures.clear();
        Ok(())
    }

    /// Returns how many times `operation` was attempted on `table`,
    /// including attempts that failed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] if the state lock is
    /// poisoned.
    pub fn operation_count(
        &self,
        operation: StoreOperation,
        table: Table,
    ) -> RecordStoreResult<usize> {
        let state = self.state.read().map_err(|err| {
            RecordStoreError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.calls.get(&(operation, table)).copied().unwrap_or_default())
    }

    /// Returns the number of live change subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn write_state(&self) -> RecordStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state
            .write()
            .map_err(|err| RecordStoreError::unavailable(std::io::Error::other(err.to_string())))
    }

    /// Counts the attempt and applies any injected failure.
    fn begin(
        &self,
        operation: StoreOperation,
        table: Table,
    ) -> RecordStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        let mut state = self.write_state()?;
        *state.calls.entry((operation, table)).or_default() += 1;
        if state.failures.contains(&(operation, table)) {
            return Err(RecordStoreError::unavailable(std::io::Error::other(format!(
                "injected {operation} failure on {table}"
            ))));
        }
        Ok(state)
    }

    fn publish(&self, notifications: Vec<ChangeNotification>) {
        for notification in notifications {
            if self.changes.send(notification).is_err() {
                trace!("change notification dropped: no subscribers");
            }
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStoreState {
    fn rows(&self, table: Table) -> &[StoredRow] {
        self.tables
            .get(&table)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

const fn required_fields(table: Table) -> &'static [&'static str] {
    match table {
        Table::Tasks => &["id", "title", "status", "category", "created_by", "created_at"],
        Table::ActivityLogs => &["id", "type", "task_title", "created_by", "created_at"],
        Table::TaskComments => &["id", "task_id", "content", "created_by", "created_at"],
    }
}

fn check_required(table: Table, record: &Record, partial: bool) -> RecordStoreResult<()> {
    for field in required_fields(table) {
        let value = record.get(*field);
        let violates = match value {
            None => !partial,
            Some(Value::Null) => true,
            Some(_) => false,
        };
        if violates {
            return Err(RecordStoreError::rejected(
                table,
                format!("null value in column \"{field}\""),
            ));
        }
    }
    Ok(())
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    match (left.as_i64(), right.as_i64()) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        _ => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
    }
}

/// Orders column values; timestamps compare chronologically, nulls first.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::String(lhs)), Some(Value::String(rhs))) => {
            match (
                DateTime::parse_from_rfc3339(lhs),
                DateTime::parse_from_rfc3339(rhs),
            ) {
                (Ok(lhs_at), Ok(rhs_at)) => lhs_at.cmp(&rhs_at),
                _ => lhs.cmp(rhs),
            }
        }
        (Some(Value::Number(lhs)), Some(Value::Number(rhs))) => compare_numbers(lhs, rhs),
        (Some(Value::Bool(lhs)), Some(Value::Bool(rhs))) => lhs.cmp(rhs),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, table: Table, query: SelectQuery) -> RecordStoreResult<Vec<Record>> {
        let state = self.begin(StoreOperation::Select, table)?;
        let mut rows: Vec<&StoredRow> = state
            .rows(table)
            .iter()
            .filter(|row| {
                query
                    .filter_ref()
                    .is_none_or(|filter| filter.matches(&row.record))
            })
            .collect();
        if let Some(order) = query.order_by_ref() {
            rows.sort_by(|lhs, rhs| {
                let ordering = compare_values(
                    lhs.record.get(order.field()),
                    rhs.record.get(order.field()),
                )
                .then(lhs.sequence.cmp(&rhs.sequence));
                if order.is_descending() {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        let limit = query.limit_value().unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn insert(&self, table: Table, records: Vec<Record>) -> RecordStoreResult<Vec<Record>> {
        let mut state = self.begin(StoreOperation::Insert, table)?;
        let mut seen: HashSet<String> = state
            .rows(table)
            .iter()
            .filter_map(|row| row.record.get("id").map(Value::to_string))
            .collect();
        for record in &records {
            check_required(table, record, false)?;
            let id = record.get("id").map(Value::to_string).unwrap_or_default();
            if !seen.insert(id.clone()) {
                return Err(RecordStoreError::rejected(
                    table,
                    format!("duplicate key value {id}"),
                ));
            }
        }

        let mut notifications = Vec::with_capacity(records.len());
        for record in &records {
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.tables.entry(table).or_default().push(StoredRow {
                sequence,
                record: record.clone(),
            });
            notifications.push(ChangeNotification {
                table,
                kind: ChangeKind::Insert,
                record: Some(record.clone()),
            });
        }
        drop(state);
        self.publish(notifications);
        Ok(records)
    }

    async fn update(
        &self,
        table: Table,
        filter: RecordFilter,
        fields: Record,
    ) -> RecordStoreResult<usize> {
        let mut state = self.begin(StoreOperation::Update, table)?;
        check_required(table, &fields, true)?;
        if fields.contains_key("id") {
            return Err(RecordStoreError::rejected(table, "primary key is immutable"));
        }

        let mut notifications = Vec::new();
        for row in state.tables.entry(table).or_default() {
            if !filter.matches(&row.record) {
                continue;
            }
            for (field, value) in &fields {
                row.record.insert(field.clone(), value.clone());
            }
            notifications.push(ChangeNotification {
                table,
                kind: ChangeKind::Update,
                record: Some(row.record.clone()),
            });
        }
        drop(state);
        let affected = notifications.len();
        self.publish(notifications);
        Ok(affected)
    }

    async fn delete(&self, table: Table, filter: RecordFilter) -> RecordStoreResult<usize> {
        let mut state = self.begin(StoreOperation::Delete, table)?;
        let rows = state.tables.entry(table).or_default();
        let (removed, kept): (Vec<StoredRow>, Vec<StoredRow>) = std::mem::take(rows)
            .into_iter()
            .partition(|row| filter.matches(&row.record));
        *rows = kept;
        drop(state);

        let affected = removed.len();
        self.publish(
            removed
                .into_iter()
                .map(|row| ChangeNotification {
                    table,
                    kind: ChangeKind::Delete,
                    record: Some(row.record),
                })
                .collect(),
        );
        Ok(affected)
    }

    fn subscribe(&self, request: SubscribeRequest) -> RecordStoreResult<ChangeSubscription> {
        drop(self.begin(StoreOperation::Subscribe, request.table())?);
        Ok(ChangeSubscription::new(request, self.changes.subscribe()))
    }
}
