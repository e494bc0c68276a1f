//! Row shapes for the `tasks`, `activity_logs`, and `task_comments` tables.
//!
//! Domain types never appear on the wire directly. Each table has a row
//! struct mirroring its columns, and conversions validate persisted
//! strings back into domain enums.

use crate::board::domain::{
    ActivityId, ActivityRecord, ActivityType, ActorId, CommentId, PersistedActivityData,
    PersistedTaskData, Task, TaskCategory, TaskComment, TaskId, TaskPatch, TaskPriority,
    TaskStatus,
};
use crate::board::ports::{Record, RecordStoreError, RecordStoreResult, Table};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

/// Primary key column shared by every table.
pub const ID: &str = "id";
/// Task reference column on activity and comment rows.
pub const TASK_ID: &str = "task_id";
/// Creation timestamp column shared by every table.
pub const CREATED_AT: &str = "created_at";

/// Row in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Non-empty title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Column name.
    pub status: String,
    /// Category name.
    pub category: String,
    /// Priority name; absent on legacy rows.
    #[serde(default)]
    pub priority: Option<String>,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Creating actor.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row in the `activity_logs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    /// Activity identifier.
    pub id: Uuid,
    /// Activity type string.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Referenced task; retained after the task is deleted.
    #[serde(default)]
    pub task_id: Option<Uuid>,
    /// Task title at the time of the activity.
    pub task_title: String,
    /// Source column.
    #[serde(default)]
    pub from_status: Option<String>,
    /// Target column.
    #[serde(default)]
    pub to_status: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub details: Option<String>,
    /// Acting operator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row in the `task_comments` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Comment body.
    pub content: String,
    /// Author.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Encodes a task for insertion.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when serialization fails.
pub fn task_to_record(task: &Task) -> RecordStoreResult<Record> {
    let row = TaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        category: task.category().as_str().to_owned(),
        priority: task.priority().map(|priority| priority.as_str().to_owned()),
        due_date: task.due_date(),
        created_by: task.created_by().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    };
    encode(Table::Tasks, &row)
}

/// Decodes a stored task row.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when a column is missing or
/// holds an unknown enum value.
pub fn record_to_task(record: Record) -> RecordStoreResult<Task> {
    let row: TaskRow = decode(Table::Tasks, record)?;
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(|err| RecordStoreError::malformed(Table::Tasks, err))?;
    let category = TaskCategory::try_from(row.category.as_str())
        .map_err(|err| RecordStoreError::malformed(Table::Tasks, err))?;
    let priority = row
        .priority
        .as_deref()
        .map(TaskPriority::try_from)
        .transpose()
        .map_err(|err| RecordStoreError::malformed(Table::Tasks, err))?;
    let created_by = ActorId::new(row.created_by)
        .map_err(|err| RecordStoreError::malformed(Table::Tasks, err))?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        status,
        category,
        priority,
        due_date: row.due_date,
        created_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Encodes the fields a patch sets, stamping `updated_at`.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when serialization fails.
pub fn patch_to_record(patch: &TaskPatch, updated_at: DateTime<Utc>) -> RecordStoreResult<Record> {
    let mut record = Record::new();
    if let Some(title) = &patch.title {
        record.insert("title".to_owned(), Value::String(title.clone()));
    }
    if let Some(description) = &patch.description {
        record.insert(
            "description".to_owned(),
            description.clone().map_or(Value::Null, Value::String),
        );
    }
    if let Some(status) = patch.status {
        record.insert("status".to_owned(), Value::from(status.as_str()));
    }
    if let Some(category) = patch.category {
        record.insert("category".to_owned(), Value::from(category.as_str()));
    }
    if let Some(priority) = patch.priority {
        record.insert("priority".to_owned(), Value::from(priority.as_str()));
    }
    if let Some(due_date) = patch.due_date {
        record.insert("due_date".to_owned(), encode_value(Table::Tasks, &due_date)?);
    }
    record.insert("updated_at".to_owned(), encode_value(Table::Tasks, &updated_at)?);
    Ok(record)
}

/// Encodes an activity record for insertion.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when serialization fails.
pub fn activity_to_record(activity: &ActivityRecord) -> RecordStoreResult<Record> {
    let row = ActivityRow {
        id: activity.id().into_inner(),
        activity_type: activity.activity_type().as_str().to_owned(),
        task_id: activity.task_id().map(TaskId::into_inner),
        task_title: activity.task_title().to_owned(),
        from_status: activity.from_status().map(|status| status.as_str().to_owned()),
        to_status: activity.to_status().map(|status| status.as_str().to_owned()),
        details: activity.details().map(str::to_owned),
        created_by: activity.created_by().as_str().to_owned(),
        created_at: activity.created_at(),
    };
    encode(Table::ActivityLogs, &row)
}

/// Decodes a stored activity row. Unknown type strings are preserved.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when a column is missing or a
/// status holds an unknown value.
pub fn record_to_activity(record: Record) -> RecordStoreResult<ActivityRecord> {
    let row: ActivityRow = decode(Table::ActivityLogs, record)?;
    let parse_status = |value: Option<String>| {
        value
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()
            .map_err(|err| RecordStoreError::malformed(Table::ActivityLogs, err))
    };
    let from_status = parse_status(row.from_status)?;
    let to_status = parse_status(row.to_status)?;
    let created_by = ActorId::new(row.created_by)
        .map_err(|err| RecordStoreError::malformed(Table::ActivityLogs, err))?;
    Ok(ActivityRecord::from_persisted(PersistedActivityData {
        id: ActivityId::from_uuid(row.id),
        activity_type: ActivityType::from(row.activity_type),
        task_id: row.task_id.map(TaskId::from_uuid),
        task_title: row.task_title,
        from_status,
        to_status,
        details: row.details,
        created_by,
        created_at: row.created_at,
    }))
}

/// Encodes a comment for insertion.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when serialization fails.
pub fn comment_to_record(comment: &TaskComment) -> RecordStoreResult<Record> {
    let row = CommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        content: comment.content().to_owned(),
        created_by: comment.created_by().as_str().to_owned(),
        created_at: comment.created_at(),
    };
    encode(Table::TaskComments, &row)
}

/// Decodes a stored comment row.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when a column is missing.
pub fn record_to_comment(record: Record) -> RecordStoreResult<TaskComment> {
    let row: CommentRow = decode(Table::TaskComments, record)?;
    let created_by = ActorId::new(row.created_by)
        .map_err(|err| RecordStoreError::malformed(Table::TaskComments, err))?;
    Ok(TaskComment::from_persisted(
        CommentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        row.content,
        created_by,
        row.created_at,
    ))
}

/// Encodes a value for use in a filter or patch.
///
/// # Errors
///
/// Returns [`RecordStoreError::Malformed`] when serialization fails.
pub fn encode_value<T: Serialize>(table: Table, value: &T) -> RecordStoreResult<Value> {
    serde_json::to_value(value).map_err(|err| RecordStoreError::malformed(table, err))
}

fn encode<T: Serialize>(table: Table, row: &T) -> RecordStoreResult<Record> {
    match encode_value(table, row)? {
        Value::Object(record) => Ok(record),
        other => Err(RecordStoreError::malformed(
            table,
            format!("expected an object row, found {other}"),
        )),
    }
}

/// Decodes every row with `decode_row`, skipping rows another client wrote
/// in a shape this build cannot read.
pub fn decode_readable<T>(
    table: Table,
    records: Vec<Record>,
    decode_row: impl Fn(Record) -> RecordStoreResult<T>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            decode_row(record)
                .inspect_err(|err| warn!(%table, error = %err, "skipping unreadable row"))
                .ok()
        })
        .collect()
}

fn decode<T: DeserializeOwned>(table: Table, record: Record) -> RecordStoreResult<T> {
    serde_json::from_value(Value::Object(record))
        .map_err(|err| RecordStoreError::malformed(table, err))
}
