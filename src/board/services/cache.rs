//! Task collection cache: the board's single owned copy of the task list.
//!
//! The cache is replaced wholesale by completed fetches and never patched.
//! Each fetch is tagged with a monotonic ticket when it is issued; a
//! completion carrying a ticket older than the last applied one is
//! discarded, so a slow fetch cannot overwrite fresher state.

use crate::board::domain::{Task, TaskId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Sequence number handed out when a fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    /// Returns the ticket's sequence number.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Immutable view of the cache at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    sequence: u64,
    tasks: Vec<Task>,
}

impl CacheSnapshot {
    /// Returns the ticket sequence that produced this snapshot; zero for
    /// the empty initial snapshot.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns every cached task, newest creation first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by identifier.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }
}

/// Owned task collection with change subscription.
#[derive(Debug)]
pub struct TaskCollectionCache {
    issued: AtomicU64,
    snapshot: watch::Sender<Arc<CacheSnapshot>>,
}

impl TaskCollectionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CacheSnapshot::default()));
        Self {
            issued: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Issues a ticket for a fetch about to start.
    #[must_use]
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replaces the cache with the result of the fetch holding `ticket`.
    ///
    /// Returns `false`, leaving the cache untouched, when a fetch issued
    /// later has already been applied.
    pub fn apply(&self, ticket: FetchTicket, tasks: Vec<Task>) -> bool {
        self.snapshot.send_if_modified(|current| {
            if ticket.0 <= current.sequence {
                return false;
            }
            *current = Arc::new(CacheSnapshot {
                sequence: ticket.0,
                tasks,
            });
            true
        })
    }

    /// Replaces the cache with `tasks` under a freshly issued ticket.
    pub fn replace(&self, tasks: Vec<Task>) -> bool {
        let ticket = self.begin_fetch();
        self.apply(ticket, tasks)
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// Subscribes to snapshot replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<CacheSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Looks up a task in the current snapshot.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<Task> {
        self.snapshot.borrow().find(id).cloned()
    }
}

impl Default for TaskCollectionCache {
    fn default() -> Self {
        Self::new()
    }
}
