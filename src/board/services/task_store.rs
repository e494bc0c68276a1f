//! Task store client: single round-trip CRUD over the `tasks` table.

use crate::board::{
    adapters::rows,
    domain::{ActorId, NewTask, Task, TaskDomainError, TaskId, TaskPatch},
    ports::{OrderBy, RecordFilter, RecordStore, RecordStoreError, SelectQuery, Table},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`TaskStoreClient`].
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// Local validation failed before any store call.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// Transport failure, or a stored row that could not be decoded.
    #[error("task store unavailable: {0}")]
    StoreUnavailable(#[source] RecordStoreError),

    /// The store refused the write.
    #[error("task store rejected the write: {0}")]
    ValidationRejected(#[source] RecordStoreError),

    /// The write matched no row; the task was removed elsewhere.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

impl From<RecordStoreError> for TaskStoreError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::Rejected { .. } => Self::ValidationRejected(err),
            RecordStoreError::Unavailable(_) | RecordStoreError::Malformed { .. } => {
                Self::StoreUnavailable(err)
            }
        }
    }
}

/// Result type for task store client operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// CRUD client for task rows.
///
/// Callers own cache refresh and activity emission; the client touches
/// nothing but the record store.
#[derive(Clone)]
pub struct TaskStoreClient<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    actor: ActorId,
}

impl<S, C> TaskStoreClient<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a client stamping new tasks with `actor`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, actor: ActorId) -> Self {
        Self {
            store,
            clock,
            actor,
        }
    }

    /// Lists every task, newest creation first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::StoreUnavailable`] on transport failure.
    /// Rows that cannot be decoded are logged and left out.
    pub async fn list(&self) -> TaskStoreResult<Vec<Task>> {
        let records = self
            .store
            .select(
                Table::Tasks,
                SelectQuery::all().order_by(OrderBy::descending(rows::CREATED_AT)),
            )
            .await?;
        Ok(rows::decode_readable(Table::Tasks, records, rows::record_to_task))
    }

    /// Validates and inserts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Validation`] for a blank title without
    /// calling the store, [`TaskStoreError::ValidationRejected`] when the
    /// store refuses the row, or [`TaskStoreError::StoreUnavailable`].
    pub async fn create(&self, new_task: &NewTask) -> TaskStoreResult<Task> {
        let task = Task::create(new_task, self.actor.clone(), &*self.clock)?;
        let record = rows::task_to_record(&task)?;
        let inserted = self.store.insert(Table::Tasks, vec![record]).await?;
        match inserted.into_iter().next() {
            Some(stored) => Ok(rows::record_to_task(stored)?),
            None => Ok(task),
        }
    }

    /// Writes the fields set in `patch` and stamps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no row matched, or a store
    /// error.
    pub async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<()> {
        let fields = rows::patch_to_record(patch, self.clock.utc())?;
        let affected = self
            .store
            .update(Table::Tasks, id_filter(id), fields)
            .await?;
        if affected == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        Ok(())
    }

    /// Deletes a task row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no row matched, or a store
    /// error.
    pub async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let affected = self.store.delete(Table::Tasks, id_filter(id)).await?;
        if affected == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        Ok(())
    }
}

fn id_filter(id: TaskId) -> RecordFilter {
    RecordFilter::eq(rows::ID, id.to_string())
}
