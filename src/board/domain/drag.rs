//! Drag and touch-swipe relocation state machine.
//!
//! Transitions are pure: each input yields the next state plus a
//! [`DragCommand`] describing the side effect the caller should perform.
//! Nothing here touches the record store or the task cache.

use super::{Task, TaskStatus};

/// Horizontal displacement a swipe must exceed to move a task.
pub const DEFAULT_SWIPE_THRESHOLD: u32 = 100;

/// Relocation progress for one board surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// Nothing is being relocated.
    #[default]
    Idle,
    /// A task is being dragged but is not over a column.
    Dragging {
        /// Task being relocated.
        task: Task,
    },
    /// A task is being dragged over a candidate drop column.
    DraggingOverColumn {
        /// Task being relocated.
        task: Task,
        /// Highlighted drop target.
        column: TaskStatus,
    },
    /// A task is being swiped on a touch surface.
    Swiping {
        /// Task being relocated.
        task: Task,
        /// Pointer offset at touch start.
        start_x: i32,
        /// Latest pointer offset.
        current_x: i32,
    },
}

impl DragState {
    /// Returns the task being relocated, if any.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::Idle => None,
            Self::Dragging { task }
            | Self::DraggingOverColumn { task, .. }
            | Self::Swiping { task, .. } => Some(task),
        }
    }

    /// Returns the highlighted drop column, if any.
    #[must_use]
    pub const fn highlighted_column(&self) -> Option<TaskStatus> {
        match self {
            Self::DraggingOverColumn { column, .. } => Some(*column),
            Self::Idle | Self::Dragging { .. } | Self::Swiping { .. } => None,
        }
    }

    /// Applies one input and returns the next state with its side effect.
    #[must_use]
    pub fn transition(self, input: DragInput, swipe_threshold: u32) -> (Self, DragCommand) {
        match (self, input) {
            (_, DragInput::DragStart(task)) => (Self::Dragging { task }, DragCommand::None),
            (
                Self::Dragging { task } | Self::DraggingOverColumn { task, .. },
                DragInput::DragOverColumn(column),
            ) => (Self::DraggingOverColumn { task, column }, DragCommand::None),
            (
                Self::Dragging { task } | Self::DraggingOverColumn { task, .. },
                DragInput::Drop(column),
            ) => (Self::Idle, DragCommand::relocate(task, Some(column))),
            (_, DragInput::TouchStart { task, x }) => (
                Self::Swiping {
                    task,
                    start_x: x,
                    current_x: x,
                },
                DragCommand::None,
            ),
            (Self::Swiping { task, start_x, .. }, DragInput::TouchMove { x }) => (
                Self::Swiping {
                    task,
                    start_x,
                    current_x: x,
                },
                DragCommand::None,
            ),
            (
                Self::Swiping {
                    task,
                    start_x,
                    current_x,
                },
                DragInput::TouchEnd,
            ) => {
                let displacement = i64::from(current_x) - i64::from(start_x);
                let target = swipe_target(task.status(), displacement, swipe_threshold);
                (Self::Idle, DragCommand::relocate(task, target))
            }
            (_, DragInput::DragEnd | DragInput::Drop(_) | DragInput::TouchEnd) => {
                (Self::Idle, DragCommand::None)
            }
            (state, DragInput::DragOverColumn(_) | DragInput::TouchMove { .. }) => {
                (state, DragCommand::None)
            }
        }
    }
}

/// Pointer and touch events fed into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragInput {
    /// Pointer drag began on a task card.
    DragStart(Task),
    /// Pointer moved over a column. Fires repeatedly.
    DragOverColumn(TaskStatus),
    /// Task released over a column.
    Drop(TaskStatus),
    /// Drag aborted outside any column.
    DragEnd,
    /// Finger touched a task card.
    TouchStart {
        /// Task under the finger.
        task: Task,
        /// Horizontal pointer offset.
        x: i32,
    },
    /// Finger moved.
    TouchMove {
        /// Horizontal pointer offset.
        x: i32,
    },
    /// Finger lifted.
    TouchEnd,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragCommand {
    /// Nothing to do.
    None,
    /// Persist a status change for `task`.
    Move {
        /// Task as it was when the relocation began.
        task: Task,
        /// Requested column.
        to: TaskStatus,
    },
}

impl DragCommand {
    fn relocate(task: Task, target: Option<TaskStatus>) -> Self {
        match target {
            Some(to) if to != task.status() => Self::Move { task, to },
            _ => Self::None,
        }
    }
}

/// Resolves a horizontal swipe into a neighbouring column.
///
/// Positive displacement beyond `threshold` advances one column, negative
/// displacement beyond it retreats one column. Anything else, including a
/// swipe off either end of the board, resolves to `None`.
#[must_use]
pub fn swipe_target(status: TaskStatus, displacement: i64, threshold: u32) -> Option<TaskStatus> {
    let limit = i64::from(threshold);
    if displacement > limit {
        status.next()
    } else if displacement < -limit {
        status.previous()
    } else {
        None
    }
}

/// Owned drag state for one board surface.
#[derive(Debug, Clone)]
pub struct DragMachine {
    state: DragState,
    swipe_threshold: u32,
}

impl DragMachine {
    /// Creates an idle machine with the given swipe threshold.
    #[must_use]
    pub const fn new(swipe_threshold: u32) -> Self {
        Self {
            state: DragState::Idle,
            swipe_threshold,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Feeds one input, returning the requested side effect.
    pub fn apply(&mut self, input: DragInput) -> DragCommand {
        let current = std::mem::take(&mut self.state);
        let (next, command) = current.transition(input, self.swipe_threshold);
        self.state = next;
        command
    }
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}
