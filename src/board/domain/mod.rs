//! Domain model for the task board.
//!
//! Tasks, activity records, comments, and the pure state machines that
//! drive relocation and inline editing. Nothing in this module performs
//! I/O; services feed it inputs and act on the commands it returns.

mod activity;
mod comment;
mod drag;
mod edit;
mod error;
mod filter;
mod ids;
mod task;

pub use activity::{
    ActivityDraft, ActivityPresentation, ActivityRecord, ActivityType, PersistedActivityData,
    TASK_UPDATED_DETAILS, relative_time,
};
pub use comment::TaskComment;
pub use drag::{
    DEFAULT_SWIPE_THRESHOLD, DragCommand, DragInput, DragMachine, DragState, swipe_target,
};
pub use edit::{EditDraft, EditSession, EditSignal, PendingSave, classify_edit};
pub use error::{
    ParseTaskCategoryError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use filter::{BoardColumns, BoardFilter};
pub use ids::{ActivityId, ActorId, CommentId, TaskId};
pub use task::{
    NewTask, PersistedTaskData, Task, TaskCategory, TaskFields, TaskPatch, TaskPriority,
    TaskStatus, Tone, normalize_description, normalize_title,
};
