//! Activity audit records and their presentation.
//!
//! Activity records are append-only evidence that a task mutation was
//! confirmed by the record store. They snapshot the task title so the log
//! stays readable after the task itself is deleted.

use super::{ActivityId, ActorId, Task, TaskId, TaskStatus, Tone};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Detail note attached to `task_updated` records.
pub const TASK_UPDATED_DETAILS: &str = "Task details updated";

/// Kind of mutation an activity record describes.
///
/// Stored type strings that this build does not know are preserved in
/// [`ActivityType::Unrecognized`] so older clients can still render newer
/// logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// A task was added to the board.
    TaskCreated,
    /// A task changed column, other than into `done`.
    TaskMoved,
    /// A task moved into `done`.
    TaskCompleted,
    /// A task was removed.
    TaskDeleted,
    /// A task's non-status fields changed.
    TaskUpdated,
    /// A type string written by a newer client.
    Unrecognized(String),
}

impl ActivityType {
    /// Classifies a confirmed status transition.
    #[must_use]
    pub const fn for_transition(to: TaskStatus) -> Self {
        match to {
            TaskStatus::Done => Self::TaskCompleted,
            TaskStatus::Todo | TaskStatus::InProgress => Self::TaskMoved,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskMoved => "task_moved",
            Self::TaskCompleted => "task_completed",
            Self::TaskDeleted => "task_deleted",
            Self::TaskUpdated => "task_updated",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Returns the glyph, label, and colour tag for this type.
    #[must_use]
    pub fn presentation(&self) -> ActivityPresentation {
        let (glyph, label, tone) = match self {
            Self::TaskCreated => ("✨", Cow::Borrowed("Created"), Tone::Accent),
            Self::TaskMoved => ("➡️", Cow::Borrowed("Moved"), Tone::Warning),
            Self::TaskCompleted => ("✅", Cow::Borrowed("Completed"), Tone::Success),
            Self::TaskDeleted => ("🗑️", Cow::Borrowed("Deleted"), Tone::Danger),
            Self::TaskUpdated => ("✏️", Cow::Borrowed("Updated"), Tone::Neutral),
            Self::Unrecognized(raw) => ("📌", Cow::Owned(raw.clone()), Tone::Muted),
        };
        ActivityPresentation { glyph, label, tone }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.trim() {
            "task_created" => Self::TaskCreated,
            "task_moved" => Self::TaskMoved,
            "task_completed" => Self::TaskCompleted,
            "task_deleted" => Self::TaskDeleted,
            "task_updated" => Self::TaskUpdated,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        match value {
            ActivityType::Unrecognized(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an activity type is rendered in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPresentation {
    /// Leading glyph.
    pub glyph: &'static str,
    /// Short label such as `Moved`.
    pub label: Cow<'static, str>,
    /// Colour tag.
    pub tone: Tone,
}

/// A mutation intent, ready to be written once the mutation is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    activity_type: ActivityType,
    task_id: Option<TaskId>,
    task_title: String,
    from_status: Option<TaskStatus>,
    to_status: Option<TaskStatus>,
    details: Option<String>,
}

impl ActivityDraft {
    /// Describes the creation of `task` into its initial column.
    #[must_use]
    pub fn created(task: &Task) -> Self {
        Self {
            activity_type: ActivityType::TaskCreated,
            task_id: Some(task.id()),
            task_title: task.title().to_owned(),
            from_status: None,
            to_status: Some(task.status()),
            details: None,
        }
    }

    /// Describes a status change of `task` from `from` to `to`.
    #[must_use]
    pub fn transition(task_id: TaskId, task_title: &str, from: TaskStatus, to: TaskStatus) -> Self {
        Self {
            activity_type: ActivityType::for_transition(to),
            task_id: Some(task_id),
            task_title: task_title.to_owned(),
            from_status: Some(from),
            to_status: Some(to),
            details: None,
        }
    }

    /// Describes a non-status field edit of a task.
    #[must_use]
    pub fn updated(task_id: TaskId, task_title: &str) -> Self {
        Self {
            activity_type: ActivityType::TaskUpdated,
            task_id: Some(task_id),
            task_title: task_title.to_owned(),
            from_status: None,
            to_status: None,
            details: Some(TASK_UPDATED_DETAILS.to_owned()),
        }
    }

    /// Describes the deletion of `task` as it was at deletion time.
    #[must_use]
    pub fn deleted(task: &Task) -> Self {
        Self {
            activity_type: ActivityType::TaskDeleted,
            task_id: Some(task.id()),
            task_title: task.title().to_owned(),
            from_status: Some(task.status()),
            to_status: None,
            details: None,
        }
    }

    /// Returns the activity type.
    #[must_use]
    pub const fn activity_type(&self) -> &ActivityType {
        &self.activity_type
    }

    /// Returns the referenced task.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the source status, if any.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the target status, if any.
    #[must_use]
    pub const fn to_status(&self) -> Option<TaskStatus> {
        self.to_status
    }

    /// Stamps the draft with an identifier, actor, and time.
    #[must_use]
    pub fn into_record(self, created_by: ActorId, clock: &impl Clock) -> ActivityRecord {
        ActivityRecord {
            id: ActivityId::new(),
            activity_type: self.activity_type,
            task_id: self.task_id,
            task_title: self.task_title,
            from_status: self.from_status,
            to_status: self.to_status,
            details: self.details,
            created_by,
            created_at: clock.utc(),
        }
    }
}

/// Immutable activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    id: ActivityId,
    activity_type: ActivityType,
    task_id: Option<TaskId>,
    task_title: String,
    from_status: Option<TaskStatus>,
    to_status: Option<TaskStatus>,
    details: Option<String>,
    created_by: ActorId,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted identifier.
    pub id: ActivityId,
    /// Persisted type.
    pub activity_type: ActivityType,
    /// Referenced task, if any.
    pub task_id: Option<TaskId>,
    /// Title snapshot.
    pub task_title: String,
    /// Source status, if any.
    pub from_status: Option<TaskStatus>,
    /// Target status, if any.
    pub to_status: Option<TaskStatus>,
    /// Detail note, if any.
    pub details: Option<String>,
    /// Actor.
    pub created_by: ActorId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            activity_type: data.activity_type,
            task_id: data.task_id,
            task_title: data.task_title,
            from_status: data.from_status,
            to_status: data.to_status,
            details: data.details,
            created_by: data.created_by,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the activity type.
    #[must_use]
    pub const fn activity_type(&self) -> &ActivityType {
        &self.activity_type
    }

    /// Returns the referenced task, which may no longer exist.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the task title as it was when the event happened.
    #[must_use]
    pub fn task_title(&self) -> &str {
        &self.task_title
    }

    /// Returns the source status, if any.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the target status, if any.
    #[must_use]
    pub const fn to_status(&self) -> Option<TaskStatus> {
        self.to_status
    }

    /// Returns the detail note, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the actor.
    #[must_use]
    pub const fn created_by(&self) -> &ActorId {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the glyph, label, and colour tag for this record.
    #[must_use]
    pub fn presentation(&self) -> ActivityPresentation {
        self.activity_type.presentation()
    }

    /// Renders the record's age relative to `now`.
    #[must_use]
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        relative_time(self.created_at, now)
    }
}

/// Renders `at` relative to `now`: `just now`, `Nm ago`, `Nh ago`,
/// `Nd ago`, or a short absolute date such as `Mar 4` after a week.
///
/// Timestamps in the future render as `just now`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use taskboard::board::domain::relative_time;
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
/// assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
/// assert_eq!(relative_time(now - Duration::days(9), now), "Mar 1");
/// ```
#[must_use]
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(at);
    if age.num_seconds() < 60 {
        return "just now".to_owned();
    }
    let minutes = age.num_minutes();
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = age.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = age.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }
    at.format("%b %-d").to_string()
}
