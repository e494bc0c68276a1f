//! Inline edit session: a transient draft of one task's fields.
//!
//! The draft is seeded from the last-known-good task when the session
//! opens and is never reconciled against later refreshes. Saving compares
//! the draft with that seed to decide which activity record, if any, the
//! save produces.

use super::{
    ActivityDraft, Task, TaskCategory, TaskDomainError, TaskFields, TaskId, TaskPatch,
    TaskPriority, TaskStatus, normalize_description, normalize_title,
};
use chrono::NaiveDate;

/// Mutable form state for an open edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    /// Title as typed; trimmed on save.
    pub title: String,
    /// Description as typed; blank means none.
    pub description: String,
    /// Selected column.
    pub status: TaskStatus,
    /// Selected category.
    pub category: TaskCategory,
    /// Selected priority.
    pub priority: TaskPriority,
    /// Selected due date.
    pub due_date: Option<NaiveDate>,
}

impl EditDraft {
    /// Seeds a draft from a task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title().to_owned(),
            description: task.description().unwrap_or_default().to_owned(),
            status: task.status(),
            category: task.category(),
            priority: task.effective_priority(),
            due_date: task.due_date(),
        }
    }

    /// Validates the draft and returns normalised fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed title is
    /// empty.
    pub fn to_fields(&self) -> Result<TaskFields, TaskDomainError> {
        Ok(TaskFields {
            title: normalize_title(&self.title)?,
            description: normalize_description(Some(&self.description)),
            status: self.status,
            category: self.category,
            priority: self.priority,
            due_date: self.due_date,
        })
    }
}

/// Input that ends or commits a session without an explicit button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSignal {
    /// Escape key; discards the draft.
    Escape,
    /// Pointer interaction outside the edit surface; discards the draft.
    OutsideClick,
    /// Keyboard accelerator; saves the draft.
    SaveShortcut,
}

/// A save that passed local validation and awaits the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    /// Task being saved.
    pub task_id: TaskId,
    /// Every draft field, normalised.
    pub patch: TaskPatch,
    /// Activity to record once the store confirms the write.
    pub activity: Option<ActivityDraft>,
}

/// Per-task edit buffer with a validation slot and a saving flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    original: Task,
    draft: EditDraft,
    error: Option<String>,
    saving: bool,
}

impl EditSession {
    /// Opens a session seeded from `task`.
    #[must_use]
    pub fn open(task: &Task) -> Self {
        Self {
            original: task.clone(),
            draft: EditDraft::from_task(task),
            error: None,
            saving: false,
        }
    }

    /// Returns the task being edited.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.original.id()
    }

    /// Returns the task as it was when the session opened.
    #[must_use]
    pub const fn original(&self) -> &Task {
        &self.original
    }

    /// Returns the current draft.
    #[must_use]
    pub const fn draft(&self) -> &EditDraft {
        &self.draft
    }

    /// Returns the draft for editing.
    pub const fn draft_mut(&mut self) -> &mut EditDraft {
        &mut self.draft
    }

    /// Returns the inline error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` while a save awaits the record store.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// Validates the draft and marks the session as saving.
    ///
    /// On validation failure the message is stored in the error slot and
    /// the session stays open and idle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed title is
    /// empty.
    pub fn begin_save(&mut self) -> Result<PendingSave, TaskDomainError> {
        let fields = match self.draft.to_fields() {
            Ok(fields) => fields,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };
        self.error = None;
        self.saving = true;
        Ok(PendingSave {
            task_id: self.original.id(),
            activity: classify_edit(&self.original, &fields),
            patch: TaskPatch::from(fields),
        })
    }

    /// Records a failed save so the operator can retry.
    pub fn fail_save(&mut self, message: impl Into<String>) {
        self.saving = false;
        self.error = Some(message.into());
    }
}

/// Decides which activity a confirmed edit produces.
///
/// A status change wins: it is logged as a move or completion and any
/// other field changes in the same save are folded into it. Otherwise any
/// detail change yields one `task_updated` record, and an unchanged draft
/// yields nothing.
#[must_use]
pub fn classify_edit(original: &Task, fields: &TaskFields) -> Option<ActivityDraft> {
    if fields.status != original.status() {
        return Some(ActivityDraft::transition(
            original.id(),
            &fields.title,
            original.status(),
            fields.status,
        ));
    }
    if fields.details_differ(&original.fields()) {
        return Some(ActivityDraft::updated(original.id(), &fields.title));
    }
    None
}
