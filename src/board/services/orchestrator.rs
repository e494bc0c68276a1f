//! Board orchestrator: composes the store clients, the task cache, the
//! relocation state machine, and the edit slot behind one handle.
//!
//! Store failures on move, delete, and refresh are logged here and turned
//! into plain outcomes. Activity writes happen strictly after the task
//! write they describe is confirmed, and their failures are logged and
//! swallowed.

use super::{
    activity::{ActivityRecorder, ActivityRecorderError},
    cache::{CacheSnapshot, TaskCollectionCache},
    comments::{CommentError, CommentService},
    edit::{EditSessionError, EditSlot},
    listener::ChangeListener,
    task_store::{TaskStoreClient, TaskStoreError},
};
use crate::board::{
    adapters::rows,
    domain::{
        ActivityDraft, ActivityRecord, BoardColumns, BoardFilter, DragCommand, DragInput,
        DragMachine, DragState, EditDraft, EditSession, EditSignal, NewTask, Task, TaskComment,
        TaskDomainError, TaskId, TaskPatch, TaskStatus,
    },
    ports::{
        ChangeNotification, EventMask, RecordFilter, RecordStore, RecordStoreError,
        SubscribeRequest, Table,
    },
};
use crate::config::{BoardConfig, ConfigError};
use mockable::Clock;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors surfaced to callers of [`BoardOrchestrator`].
#[derive(Debug, Error)]
pub enum BoardError {
    /// The board view has been closed.
    #[error("the board is closed")]
    Closed,

    /// Tasks cannot be created directly into the done column.
    #[error("tasks cannot be created in the done column")]
    CreateIntoDone,

    /// Local validation failed before any store call.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The task store rejected or failed the write.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The change feed could not be subscribed.
    #[error(transparent)]
    Subscribe(#[from] RecordStoreError),
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No move was requested, or the target equals the current status.
    Unchanged,
    /// The status change was persisted.
    Moved {
        /// Whether the matching activity record was written.
        activity_recorded: bool,
    },
    /// The store write failed; the task keeps its last confirmed status.
    Failed,
}

impl MoveOutcome {
    /// Returns `true` when the status change was persisted.
    #[must_use]
    pub const fn is_moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Operator answer to the destructive-delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    /// Proceed with the delete.
    Confirmed,
    /// Keep the task.
    Declined,
}

/// Shared handle to one board view. Clones refer to the same view.
pub struct BoardOrchestrator<S, C>
where
    S: RecordStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    inner: Arc<BoardInner<S, C>>,
}

impl<S, C> Clone for BoardOrchestrator<S, C>
where
    S: RecordStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct BoardInner<S, C>
where
    S: RecordStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    tasks: TaskStoreClient<S, C>,
    activity: ActivityRecorder<S, C>,
    comments: CommentService<S, C>,
    cache: TaskCollectionCache,
    edit: Mutex<EditSlot>,
    drag: Mutex<DragMachine>,
    filter: RwLock<BoardFilter>,
    listener: Mutex<Option<ChangeListener>>,
    activity_revision: watch::Sender<u64>,
    active: AtomicBool,
    config: BoardConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S, C> BoardOrchestrator<S, C>
where
    S: RecordStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Opens a board view over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Config`] when `config` fails validation.
    pub fn new(store: Arc<S>, clock: Arc<C>, config: BoardConfig) -> Result<Self, BoardError> {
        config.validate()?;
        let actor = config.actor_id()?;
        let (activity_revision, _) = watch::channel(0);
        let inner = BoardInner {
            tasks: TaskStoreClient::new(Arc::clone(&store), Arc::clone(&clock), actor.clone()),
            activity: ActivityRecorder::new(Arc::clone(&store), Arc::clone(&clock), actor.clone()),
            comments: CommentService::new(Arc::clone(&store), clock, actor),
            store,
            cache: TaskCollectionCache::new(),
            edit: Mutex::new(EditSlot::new()),
            drag: Mutex::new(DragMachine::new(config.swipe_threshold)),
            filter: RwLock::new(BoardFilter::all()),
            listener: Mutex::new(None),
            activity_revision,
            active: AtomicBool::new(true),
            config,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the configuration the view was opened with.
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.inner.config
    }

    /// Returns `true` until [`BoardOrchestrator::close`] is called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Returns the task cache.
    #[must_use]
    pub fn cache(&self) -> &TaskCollectionCache {
        &self.inner.cache
    }

    /// Returns the current cache snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.inner.cache.snapshot()
    }

    /// Re-fetches every task and replaces the cache.
    ///
    /// Returns `true` when the fetch was applied. A failed fetch, a fetch
    /// overtaken by a newer one, or a fetch completing after the view closed
    /// leaves the cache untouched.
    pub async fn refresh(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        let ticket = self.inner.cache.begin_fetch();
        let tasks = match self.inner.tasks.list().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "task fetch failed");
                return false;
            }
        };
        if !self.is_active() {
            debug!(ticket = ticket.sequence(), "task fetch completed after close");
            return false;
        }
        let applied = self.inner.cache.apply(ticket, tasks);
        if !applied {
            debug!(ticket = ticket.sequence(), "discarded stale task fetch");
        }
        applied
    }

    /// Starts a refresh without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn_refresh(&self) -> JoinHandle<bool> {
        let board = self.clone();
        tokio::spawn(async move { board.refresh().await })
    }

    /// Returns the active category and search filter.
    #[must_use]
    pub fn filter(&self) -> BoardFilter {
        self.inner
            .filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the active filter.
    pub fn set_filter(&self, filter: BoardFilter) {
        *self
            .inner
            .filter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = filter;
    }

    /// Derives the three visible columns from the cache and the filter.
    #[must_use]
    pub fn columns(&self) -> BoardColumns {
        let snapshot = self.inner.cache.snapshot();
        BoardColumns::partition(snapshot.tasks(), &self.filter())
    }

    /// Creates a task from the add form of its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Closed`], [`BoardError::CreateIntoDone`], or
    /// [`BoardError::Validation`] without calling the store, or
    /// [`BoardError::Store`] when the insert fails.
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, BoardError> {
        if !self.is_active() {
            return Err(BoardError::Closed);
        }
        if !new_task.status().accepts_new_tasks() {
            return Err(BoardError::CreateIntoDone);
        }
        new_task.validate()?;
        let task = self.inner.tasks.create(&new_task).await.inspect_err(|err| {
            warn!(error = %err, "task create failed");
        })?;
        info!(task_id = %task.id(), status = %task.status(), "task created");
        self.record_activity(ActivityDraft::created(&task)).await;
        self.refresh().await;
        Ok(task)
    }

    /// Moves `task` to `to`.
    ///
    /// Moving to the current status makes no store call and records nothing.
    pub async fn move_task(&self, task: &Task, to: TaskStatus) -> MoveOutcome {
        if to == task.status() {
            return MoveOutcome::Unchanged;
        }
        if !self.is_active() {
            return MoveOutcome::Failed;
        }
        let from = task.status();
        if let Err(err) = self
            .inner
            .tasks
            .update_fields(task.id(), &TaskPatch::status(to))
            .await
        {
            warn!(task_id = %task.id(), %from, %to, error = %err, "task move failed");
            return MoveOutcome::Failed;
        }
        info!(task_id = %task.id(), %from, %to, "task moved");
        let activity_recorded = self
            .record_activity(ActivityDraft::transition(task.id(), task.title(), from, to))
            .await;
        self.refresh().await;
        MoveOutcome::Moved { activity_recorded }
    }

    /// Feeds a pointer or touch event to the relocation state machine and
    /// performs any move it resolves.
    pub async fn handle_drag(&self, input: DragInput) -> MoveOutcome {
        let command = lock(&self.inner.drag).apply(input);
        match command {
            DragCommand::None => MoveOutcome::Unchanged,
            DragCommand::Move { task, to } => self.move_task(&task, to).await,
        }
    }

    /// Returns the relocation state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        lock(&self.inner.drag).state().clone()
    }

    /// Deletes `task` once the operator has confirmed.
    ///
    /// Returns `true` when the row was removed. A declined confirmation or a
    /// failed store call returns `false` and records nothing.
    pub async fn delete_task(&self, task: &Task, confirmation: DeleteConfirmation) -> bool {
        if confirmation == DeleteConfirmation::Declined || !self.is_active() {
            return false;
        }
        if let Err(err) = self.inner.tasks.delete(task.id()).await {
            warn!(task_id = %task.id(), error = %err, "task delete failed");
            return false;
        }
        info!(task_id = %task.id(), "task deleted");
        {
            let mut slot = lock(&self.inner.edit);
            if slot.is_editing(task.id()) {
                slot.cancel();
            }
        }
        self.record_activity(ActivityDraft::deleted(task)).await;
        self.refresh().await;
        true
    }

    /// Opens an edit session for `task`, replacing any open session.
    pub fn open_edit(&self, task: &Task) {
        lock(&self.inner.edit).open(task);
    }

    /// Returns a copy of the open edit session.
    #[must_use]
    pub fn edit_session(&self) -> Option<EditSession> {
        lock(&self.inner.edit).session().cloned()
    }

    /// Applies `edit` to the open draft.
    ///
    /// # Errors
    ///
    /// Returns [`EditSessionError::NoActiveSession`] or
    /// [`EditSessionError::SaveInProgress`].
    pub fn update_draft(
        &self,
        edit: impl FnOnce(&mut EditDraft),
    ) -> Result<(), EditSessionError> {
        lock(&self.inner.edit).update_draft(edit)
    }

    /// Discards the open draft. Returns `false` when nothing was open.
    pub fn cancel_edit(&self) -> bool {
        lock(&self.inner.edit).cancel().is_some()
    }

    /// Handles escape, outside-click, and save-shortcut signals.
    ///
    /// # Errors
    ///
    /// Returns the error from [`BoardOrchestrator::save_edit`] for the save
    /// shortcut.
    pub async fn handle_edit_signal(&self, signal: EditSignal) -> Result<(), EditSessionError> {
        match signal {
            EditSignal::Escape | EditSignal::OutsideClick => {
                self.cancel_edit();
                Ok(())
            }
            EditSignal::SaveShortcut => self.save_edit().await,
        }
    }

    /// Validates and persists the open draft.
    ///
    /// A blank title stores the validation message in the session and makes
    /// no store call. A failed write keeps the session open with the error
    /// message and records nothing. On success the session closes, the
    /// classified activity (if any) is recorded, and the cache refreshes.
    ///
    /// # Errors
    ///
    /// Returns [`EditSessionError::Validation`],
    /// [`EditSessionError::NoActiveSession`],
    /// [`EditSessionError::SaveInProgress`], or [`EditSessionError::Store`].
    pub async fn save_edit(&self) -> Result<(), EditSessionError> {
        let (generation, pending) = lock(&self.inner.edit).begin_save()?;
        if let Err(err) = self
            .inner
            .tasks
            .update_fields(pending.task_id, &pending.patch)
            .await
        {
            warn!(task_id = %pending.task_id, error = %err, "task save failed");
            lock(&self.inner.edit).fail_save(generation, err.to_string());
            return Err(EditSessionError::Store(err));
        }
        info!(task_id = %pending.task_id, "task saved");
        lock(&self.inner.edit).complete_save(generation);
        if let Some(draft) = pending.activity {
            self.record_activity(draft).await;
        }
        self.refresh().await;
        Ok(())
    }

    /// Lists recent activity, most recent first. Read failures yield an
    /// empty feed.
    pub async fn activity_feed(&self, limit: Option<usize>) -> Vec<ActivityRecord> {
        self.list_activity(limit, None).await
    }

    /// Lists one task's activity history, most recent first.
    pub async fn task_history(
        &self,
        task_id: TaskId,
        limit: Option<usize>,
    ) -> Vec<ActivityRecord> {
        self.list_activity(limit, Some(task_id)).await
    }

    /// Subscribes to a counter bumped whenever the activity table may have
    /// changed.
    #[must_use]
    pub fn activity_revision(&self) -> watch::Receiver<u64> {
        self.inner.activity_revision.subscribe()
    }

    /// Lists a task's comments, oldest first. Read failures yield an empty
    /// list.
    pub async fn comments(&self, task_id: TaskId) -> Vec<TaskComment> {
        match self.inner.comments.list(task_id).await {
            Ok(comments) => comments,
            Err(err) => {
                warn!(%task_id, error = %err, "comment fetch failed");
                Vec::new()
            }
        }
    }

    /// Adds a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Validation`] for blank content, or
    /// [`CommentError::Store`] when the insert fails.
    pub async fn add_comment(
        &self,
        task_id: TaskId,
        content: &str,
    ) -> Result<TaskComment, CommentError> {
        self.inner
            .comments
            .add(task_id, content)
            .await
            .inspect_err(|err| warn!(%task_id, error = %err, "comment add failed"))
    }

    /// Subscribes to the task and activity tables; every notification
    /// triggers a full refresh. Replaces any previous subscription.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Closed`] after close, or
    /// [`BoardError::Subscribe`] when the change feed is unreachable.
    pub fn start_listening(&self) -> Result<(), BoardError> {
        if !self.is_active() {
            return Err(BoardError::Closed);
        }
        let subscriptions = vec![
            self.inner
                .store
                .subscribe(SubscribeRequest::new(Table::Tasks).with_mask(EventMask::ALL))?,
            self.inner.store.subscribe(
                SubscribeRequest::new(Table::ActivityLogs).with_mask(EventMask::INSERT),
            )?,
        ];
        let board = Arc::downgrade(&self.inner);
        let listener = ChangeListener::spawn(subscriptions, move |notification| {
            Self::on_board_change(Weak::clone(&board), notification)
        });
        *lock(&self.inner.listener) = Some(listener);
        info!("board change listener started");
        Ok(())
    }

    /// Watches one task's activity and comments, invoking `on_change` for
    /// every notification until the returned listener is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Subscribe`] when the change feed is unreachable.
    pub fn watch_task_detail<F>(
        &self,
        task_id: TaskId,
        on_change: F,
    ) -> Result<ChangeListener, BoardError>
    where
        F: Fn(ChangeNotification) + Clone + Send + Sync + 'static,
    {
        let filter = RecordFilter::eq(rows::TASK_ID, task_id.to_string());
        let subscriptions = vec![
            self.inner.store.subscribe(
                SubscribeRequest::new(Table::ActivityLogs)
                    .with_mask(EventMask::INSERT)
                    .with_filter(filter.clone()),
            )?,
            self.inner.store.subscribe(
                SubscribeRequest::new(Table::TaskComments)
                    .with_mask(EventMask::ALL)
                    .with_filter(filter),
            )?,
        ];
        Ok(ChangeListener::spawn(subscriptions, move |notification| {
            on_change(notification);
            std::future::ready(ControlFlow::Continue(()))
        }))
    }

    /// Closes the view: unsubscribes from change notifications and drops
    /// any open draft. In-flight operations finish but no longer update the
    /// cache.
    pub fn close(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(mut listener) = lock(&self.inner.listener).take() {
            listener.shutdown();
        }
        lock(&self.inner.edit).cancel();
        *lock(&self.inner.drag) = DragMachine::new(self.inner.config.swipe_threshold);
        info!("board closed");
    }

    async fn on_board_change(
        board: Weak<BoardInner<S, C>>,
        notification: ChangeNotification,
    ) -> ControlFlow<()> {
        let Some(inner) = board.upgrade() else {
            return ControlFlow::Break(());
        };
        let view = Self { inner };
        if !view.is_active() {
            return ControlFlow::Break(());
        }
        debug!(table = %notification.table, kind = ?notification.kind, "change notification");
        if notification.table == Table::ActivityLogs {
            view.inner.activity_revision.send_modify(|revision| *revision += 1);
        }
        view.refresh().await;
        ControlFlow::Continue(())
    }

    async fn record_activity(&self, draft: ActivityDraft) -> bool {
        match self.inner.activity.record(draft).await {
            Ok(record) => {
                debug!(
                    activity_id = %record.id(),
                    activity_type = %record.activity_type(),
                    "activity recorded"
                );
                self.inner.activity_revision.send_modify(|revision| *revision += 1);
                true
            }
            Err(err) => {
                log_activity_failure(&err);
                false
            }
        }
    }

    async fn list_activity(
        &self,
        limit: Option<usize>,
        task_id: Option<TaskId>,
    ) -> Vec<ActivityRecord> {
        let row_limit = limit.unwrap_or(self.inner.config.activity_feed_limit);
        match self.inner.activity.list(row_limit, task_id).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "activity fetch failed");
                Vec::new()
            }
        }
    }
}

fn log_activity_failure(err: &ActivityRecorderError) {
    warn!(error = %err, "activity write failed; task change kept");
}
