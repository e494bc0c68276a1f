//! Free-text comments attached to a task.

use super::{ActorId, CommentId, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A comment left on a task's detail surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    id: CommentId,
    task_id: TaskId,
    content: String,
    created_by: ActorId,
    created_at: DateTime<Utc>,
}

impl TaskComment {
    /// Creates a comment, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] when nothing remains after
    /// trimming.
    pub fn new(
        task_id: TaskId,
        content: &str,
        created_by: ActorId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyComment);
        }
        Ok(Self {
            id: CommentId::new(),
            task_id,
            content: trimmed.to_owned(),
            created_by,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a comment from persisted fields.
    #[must_use]
    pub const fn from_persisted(
        id: CommentId,
        task_id: TaskId,
        content: String,
        created_by: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            content,
            created_by,
            created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the task the comment belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the trimmed comment body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the author.
    #[must_use]
    pub const fn created_by(&self) -> &ActorId {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
