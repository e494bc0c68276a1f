//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or validating board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("Task title is required")]
    EmptyTitle,

    /// The comment body is empty after trimming.
    #[error("comment must not be empty")]
    EmptyComment,

    /// The actor identifier is empty after trimming.
    #[error("actor identifier must not be empty")]
    EmptyActor,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task categories from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task category: {0}")]
pub struct ParseTaskCategoryError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
