//! Shared test helpers for in-memory board integration tests.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::board::{
    adapters::memory::InMemoryRecordStore,
    domain::{NewTask, Task, TaskCategory, TaskStatus},
    services::BoardOrchestrator,
};
use taskboard::config::BoardConfig;

/// Board type used across the in-memory integration tests.
pub type TestBoard = BoardOrchestrator<InMemoryRecordStore, DefaultClock>;

/// Upper bound on how long a test waits for a pushed change to land.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Provides a fresh in-memory store for each test.
#[fixture]
pub fn store() -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::new())
}

/// Opens a board view over `store` acting as `actor`.
///
/// # Errors
///
/// Returns an error if the configuration is rejected.
pub fn open_board(
    store: &Arc<InMemoryRecordStore>,
    actor: &str,
) -> Result<TestBoard, eyre::Report> {
    let config = BoardConfig {
        actor: actor.to_owned(),
        ..BoardConfig::default()
    };
    let board = BoardOrchestrator::new(Arc::clone(store), Arc::new(DefaultClock), config)?;
    Ok(board)
}

/// Creates a work task titled `title` in `status`.
///
/// # Errors
///
/// Returns an error if the board rejects the task.
pub async fn seed_task(
    board: &TestBoard,
    title: &str,
    status: TaskStatus,
) -> Result<Task, eyre::Report> {
    let task = board
        .create_task(NewTask::new(title, status, TaskCategory::Work))
        .await?;
    Ok(task)
}

/// Polls `condition` until it holds or [`SETTLE_TIMEOUT`] elapses.
///
/// Returns `true` when the condition was observed.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
