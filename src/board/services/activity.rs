//! Append-only activity recorder over the `activity_logs` table.

use crate::board::{
    adapters::rows,
    domain::{ActivityDraft, ActivityRecord, ActorId, TaskId},
    ports::{OrderBy, RecordFilter, RecordStore, RecordStoreError, SelectQuery, Table},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`ActivityRecorder`].
#[derive(Debug, Clone, Error)]
pub enum ActivityRecorderError {
    /// The activity row could not be written.
    #[error("activity write failed: {0}")]
    WriteFailed(#[source] RecordStoreError),

    /// The activity feed could not be read.
    #[error("activity read failed: {0}")]
    ReadFailed(#[source] RecordStoreError),
}

/// Writes and lists immutable activity records.
///
/// Records are only ever inserted; nothing here updates or deletes a row.
#[derive(Clone)]
pub struct ActivityRecorder<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    actor: ActorId,
}

impl<S, C> ActivityRecorder<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a recorder stamping records with `actor`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, actor: ActorId) -> Self {
        Self {
            store,
            clock,
            actor,
        }
    }

    /// Persists one activity record for a confirmed mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError::WriteFailed`] when the insert fails.
    pub async fn record(
        &self,
        draft: ActivityDraft,
    ) -> Result<ActivityRecord, ActivityRecorderError> {
        let record = draft.into_record(self.actor.clone(), &*self.clock);
        let row = rows::activity_to_record(&record).map_err(ActivityRecorderError::WriteFailed)?;
        self.store
            .insert(Table::ActivityLogs, vec![row])
            .await
            .map_err(ActivityRecorderError::WriteFailed)?;
        Ok(record)
    }

    /// Lists up to `limit` records, most recent first, optionally for one
    /// task only.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError::ReadFailed`] when the select fails.
    /// Undecodable rows are skipped.
    pub async fn list(
        &self,
        limit: usize,
        task_id: Option<TaskId>,
    ) -> Result<Vec<ActivityRecord>, ActivityRecorderError> {
        let mut query = SelectQuery::all()
            .order_by(OrderBy::descending(rows::CREATED_AT))
            .limit(limit);
        if let Some(id) = task_id {
            query = query.filter(RecordFilter::eq(rows::TASK_ID, id.to_string()));
        }
        let records = self
            .store
            .select(Table::ActivityLogs, query)
            .await
            .map_err(ActivityRecorderError::ReadFailed)?;
        Ok(rows::decode_readable(Table::ActivityLogs, records, rows::record_to_activity))
    }
}
