//! Pure projections from the task cache to the three visible columns.

use super::{Task, TaskCategory, TaskStatus};

/// Active category filter and title search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    category: Option<TaskCategory>,
    query: String,
}

impl BoardFilter {
    /// Creates a filter that shows every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the board to one category, or `None` for all.
    #[must_use]
    pub const fn with_category(mut self, category: Option<TaskCategory>) -> Self {
        self.category = category;
        self
    }

    /// Sets the case-insensitive title search.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Returns the active category, if any.
    #[must_use]
    pub const fn category(&self) -> Option<TaskCategory> {
        self.category
    }

    /// Returns the active search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns `true` when `task` passes both filters.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.category
            .is_none_or(|category| task.category() == category)
            && task.title_matches(&self.query)
    }
}

/// The three visible columns, each in cache order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardColumns {
    todo: Vec<Task>,
    in_progress: Vec<Task>,
    done: Vec<Task>,
}

impl BoardColumns {
    /// Partitions `tasks` by status after applying `filter`.
    #[must_use]
    pub fn partition<'a>(tasks: impl IntoIterator<Item = &'a Task>, filter: &BoardFilter) -> Self {
        let mut columns = Self::default();
        for task in tasks.into_iter().filter(|task| filter.matches(task)) {
            let column = match task.status() {
                TaskStatus::Todo => &mut columns.todo,
                TaskStatus::InProgress => &mut columns.in_progress,
                TaskStatus::Done => &mut columns.done,
            };
            column.push(task.clone());
        }
        columns
    }

    /// Returns the tasks in one column.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    /// Returns the number of tasks in one column.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        self.column(status).len()
    }

    /// Returns the column a task currently appears in, if visible.
    #[must_use]
    pub fn status_of(&self, title: &str) -> Option<TaskStatus> {
        TaskStatus::ALL.into_iter().find(|status| {
            self.column(*status)
                .iter()
                .any(|task| task.title() == title)
        })
    }
}
