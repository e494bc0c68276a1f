//! Application services for the task board.

mod activity;
mod cache;
mod comments;
mod edit;
mod listener;
mod orchestrator;
mod task_store;

pub use activity::{ActivityRecorder, ActivityRecorderError};
pub use cache::{CacheSnapshot, FetchTicket, TaskCollectionCache};
pub use comments::{CommentError, CommentService};
pub use edit::{EditSessionError, EditSlot};
pub use listener::ChangeListener;
pub use orchestrator::{BoardError, BoardOrchestrator, DeleteConfirmation, MoveOutcome};
pub use task_store::{TaskStoreClient, TaskStoreError, TaskStoreResult};
