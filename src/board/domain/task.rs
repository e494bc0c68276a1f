//! Task aggregate and the value types that describe a task's editable fields.

use super::{
    ActorId, ParseTaskCategoryError, ParseTaskPriorityError, ParseTaskStatusError,
    TaskDomainError, TaskId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic colour tag used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Brand accent colour.
    Accent,
    /// Attention without alarm.
    Warning,
    /// Positive outcome.
    Success,
    /// Destructive or overdue.
    Danger,
    /// Secondary text colour.
    Neutral,
    /// De-emphasised text colour.
    Muted,
}

/// Board column a task currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    Todo,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Done,
}

impl TaskStatus {
    /// All statuses in column order, left to right.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Returns the column heading shown to the operator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Returns the colour tag for the column indicator.
    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::Todo => Tone::Neutral,
            Self::InProgress => Tone::Accent,
            Self::Done => Tone::Success,
        }
    }

    /// Returns the column to the right, or `None` from `done`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns the column to the left, or `None` from `todo`.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Todo => None,
            Self::InProgress => Some(Self::Todo),
            Self::Done => Some(Self::InProgress),
        }
    }

    /// Returns `true` when new tasks may be added directly into this column.
    #[must_use]
    pub const fn accepts_new_tasks(self) -> bool {
        !matches!(self, Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Day job.
    Work,
    /// Side project.
    Project,
    /// Career development.
    Career,
    /// Money matters.
    Finance,
    /// Everything else.
    Personal,
}

impl TaskCategory {
    /// All categories in form order.
    pub const ALL: [Self; 5] = [
        Self::Work,
        Self::Project,
        Self::Career,
        Self::Finance,
        Self::Personal,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Project => "project",
            Self::Career => "career",
            Self::Finance => "finance",
            Self::Personal => "personal",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Project => "Project",
            Self::Career => "Career",
            Self::Finance => "Finance",
            Self::Personal => "Personal",
        }
    }

    /// Returns the glyph used in the add-task form.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Work => "💼",
            Self::Project => "🚀",
            Self::Career => "📈",
            Self::Finance => "💰",
            Self::Personal => "🏠",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskCategory {
    type Error = ParseTaskCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "work" => Ok(Self::Work),
            "project" => Ok(Self::Project),
            "career" => Ok(Self::Career),
            "finance" => Ok(Self::Finance),
            "personal" => Ok(Self::Personal),
            _ => Err(ParseTaskCategoryError(value.to_owned())),
        }
    }
}

/// Task urgency. Absent priorities are treated as [`TaskPriority::Medium`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Do first.
    High,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns the colour tag for the priority badge.
    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::Low => Tone::Success,
            Self::Medium => Tone::Warning,
            Self::High => Tone::Danger,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// The operator-editable fields of a task, normalised for comparison.
///
/// Priority is always concrete here: an absent stored priority reads as
/// [`TaskPriority::Medium`], and a blank description reads as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Board column.
    pub status: TaskStatus,
    /// Life area.
    pub category: TaskCategory,
    /// Effective priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

impl TaskFields {
    /// Returns `true` when any field other than `status` differs.
    #[must_use]
    pub fn details_differ(&self, other: &Self) -> bool {
        self.title != other.title
            || self.description != other.description
            || self.category != other.category
            || self.priority != other.priority
            || self.due_date != other.due_date
    }
}

/// Request payload for creating a task from the add-task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    status: TaskStatus,
    category: TaskCategory,
    priority: TaskPriority,
    due_date: Option<NaiveDate>,
}

impl NewTask {
    /// Creates a request with the required form fields.
    #[must_use]
    pub fn new(title: impl Into<String>, status: TaskStatus, category: TaskCategory) -> Self {
        Self {
            title: title.into(),
            description: None,
            status,
            category,
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the requested initial column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Validates the request and returns normalised fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn validate(&self) -> Result<TaskFields, TaskDomainError> {
        Ok(TaskFields {
            title: normalize_title(&self.title)?,
            description: normalize_description(self.description.as_deref()),
            status: self.status,
            category: self.category,
            priority: self.priority,
            due_date: self.due_date,
        })
    }
}

/// Partial update applied to a stored task.
///
/// Only fields that are `Some` are written; `description: Some(None)`
/// clears the stored description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New category.
    pub category: Option<TaskCategory>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New due date, or `Some(None)` to clear it.
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// Creates a patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl From<TaskFields> for TaskPatch {
    fn from(fields: TaskFields) -> Self {
        Self {
            title: Some(fields.title),
            description: Some(fields.description),
            status: Some(fields.status),
            category: Some(fields.category),
            priority: Some(fields.priority),
            due_date: Some(fields.due_date),
        }
    }
}

/// Task aggregate as last confirmed by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    category: TaskCategory,
    priority: Option<TaskPriority>,
    due_date: Option<NaiveDate>,
    created_by: ActorId,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted column.
    pub status: TaskStatus,
    /// Persisted category.
    pub category: TaskCategory,
    /// Persisted priority, if any.
    pub priority: Option<TaskPriority>,
    /// Persisted due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Persisted creator.
    pub created_by: ActorId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-update timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task from a validated add-task request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn create(
        request: &NewTask,
        created_by: ActorId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let fields = request.validate()?;
        Ok(Self {
            id: TaskId::new(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            category: fields.category,
            priority: Some(fields.priority),
            due_date: fields.due_date,
            created_by,
            created_at: clock.utc(),
            updated_at: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            category: data.category,
            priority: data.priority,
            due_date: data.due_date,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the board column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> TaskCategory {
        self.category
    }

    /// Returns the stored priority, which may be absent.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the stored priority, defaulting to medium when absent.
    #[must_use]
    pub fn effective_priority(&self) -> TaskPriority {
        self.priority.unwrap_or_default()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> &ActorId {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp, if the task was ever updated.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns the editable fields in normalised form.
    #[must_use]
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.trim().to_owned(),
            description: normalize_description(self.description.as_deref()),
            status: self.status,
            category: self.category,
            priority: self.effective_priority(),
            due_date: self.due_date,
        }
    }

    /// Returns `true` when the task is past its due date and not done.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done
            && self
                .due_date
                .is_some_and(|due_date| due_date < now.date_naive())
    }

    /// Returns `true` when the title contains `query`, ignoring case.
    ///
    /// An empty query matches every task.
    #[must_use]
    pub fn title_matches(&self, query: &str) -> bool {
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Trims a title and rejects it when blank.
///
/// # Errors
///
/// Returns [`TaskDomainError::EmptyTitle`] when nothing remains after
/// trimming.
pub fn normalize_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

/// Maps a blank description to `None`.
#[must_use]
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
}
