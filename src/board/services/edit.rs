//! Edit slot: the single draft binding of one task-detail surface.

use super::task_store::TaskStoreError;
use crate::board::domain::{EditDraft, EditSession, PendingSave, Task, TaskDomainError, TaskId};
use thiserror::Error;
use tracing::debug;

/// Errors returned by edit-session operations.
#[derive(Debug, Clone, Error)]
pub enum EditSessionError {
    /// The draft failed local validation; the session stays open.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// No session is open.
    #[error("no edit session is open")]
    NoActiveSession,

    /// A save is already waiting on the store.
    #[error("a save is already in progress")]
    SaveInProgress,

    /// The store write failed; the session stays open for a retry.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Holds at most one open [`EditSession`].
///
/// Opening a session while another is open cancels the previous one. Each
/// open bumps a generation counter so a save that completes after its
/// session was replaced cannot close or annotate the newer session.
#[derive(Debug, Default)]
pub struct EditSlot {
    session: Option<EditSession>,
    generation: u64,
}

impl EditSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `task`, discarding any open draft, and returns
    /// the new generation.
    pub fn open(&mut self, task: &Task) -> u64 {
        if let Some(previous) = &self.session {
            debug!(task_id = %previous.task_id(), "edit session replaced");
        }
        self.generation += 1;
        self.session = Some(EditSession::open(task));
        self.generation
    }

    /// Returns the open session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Returns `true` when a session for `task_id` is open.
    #[must_use]
    pub fn is_editing(&self, task_id: TaskId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.task_id() == task_id)
    }

    /// Applies `edit` to the open draft.
    ///
    /// # Errors
    ///
    /// Returns [`EditSessionError::NoActiveSession`] when nothing is open,
    /// or [`EditSessionError::SaveInProgress`] while a save is pending.
    pub fn update_draft(
        &mut self,
        edit: impl FnOnce(&mut EditDraft),
    ) -> Result<(), EditSessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(EditSessionError::NoActiveSession)?;
        if session.is_saving() {
            return Err(EditSessionError::SaveInProgress);
        }
        edit(session.draft_mut());
        Ok(())
    }

    /// Discards the open draft, returning it.
    pub const fn cancel(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Validates the draft and marks the session as saving.
    ///
    /// # Errors
    ///
    /// Returns [`EditSessionError::Validation`] when the title is blank,
    /// [`EditSessionError::NoActiveSession`], or
    /// [`EditSessionError::SaveInProgress`].
    pub fn begin_save(&mut self) -> Result<(u64, PendingSave), EditSessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(EditSessionError::NoActiveSession)?;
        if session.is_saving() {
            return Err(EditSessionError::SaveInProgress);
        }
        let pending = session.begin_save()?;
        Ok((self.generation, pending))
    }

    /// Closes the session after a confirmed save.
    ///
    /// Returns `false` when the session was replaced or cancelled while the
    /// save was in flight.
    pub fn complete_save(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.session.is_none() {
            return false;
        }
        self.session = None;
        true
    }

    /// Re-opens the session for a retry after a failed save.
    pub fn fail_save(&mut self, generation: u64, message: impl Into<String>) {
        if generation != self.generation {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.fail_save(message);
        }
    }
}
