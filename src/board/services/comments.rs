//! Comment service over the `task_comments` table.

use crate::board::{
    adapters::rows,
    domain::{ActorId, TaskComment, TaskDomainError, TaskId},
    ports::{OrderBy, RecordFilter, RecordStore, RecordStoreError, SelectQuery, Table},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`CommentService`].
#[derive(Debug, Clone, Error)]
pub enum CommentError {
    /// The comment failed local validation.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The record store call failed.
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

/// Lists and adds free-text comments on a task. Comments are not audited.
#[derive(Clone)]
pub struct CommentService<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    actor: ActorId,
}

impl<S, C> CommentService<S, C>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    /// Creates a service stamping comments with `actor`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, actor: ActorId) -> Self {
        Self {
            store,
            clock,
            actor,
        }
    }

    /// Lists a task's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Store`] when the select fails. Undecodable
    /// rows are skipped.
    pub async fn list(&self, task_id: TaskId) -> Result<Vec<TaskComment>, CommentError> {
        let records = self
            .store
            .select(
                Table::TaskComments,
                SelectQuery::all()
                    .filter(RecordFilter::eq(rows::TASK_ID, task_id.to_string()))
                    .order_by(OrderBy::ascending(rows::CREATED_AT)),
            )
            .await?;
        Ok(rows::decode_readable(Table::TaskComments, records, rows::record_to_comment))
    }

    /// Adds a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Validation`] for blank content without
    /// calling the store, or [`CommentError::Store`] when the insert fails.
    pub async fn add(&self, task_id: TaskId, content: &str) -> Result<TaskComment, CommentError> {
        let comment = TaskComment::new(task_id, content, self.actor.clone(), &*self.clock)?;
        let row = rows::comment_to_record(&comment)?;
        self.store.insert(Table::TaskComments, vec![row]).await?;
        Ok(comment)
    }
}
