//! Shared world state for board lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::board::{
    adapters::memory::InMemoryRecordStore,
    domain::{Task, TaskStatus},
    services::BoardOrchestrator,
};
use taskboard::config::BoardConfig;

/// Board type used by the BDD world.
pub type TestBoard = BoardOrchestrator<InMemoryRecordStore, DefaultClock>;

/// Scenario world for board lifecycle behaviour tests.
pub struct BoardWorld {
    pub store: Arc<InMemoryRecordStore>,
    pub board: TestBoard,
    pub last_error: Option<String>,
}

impl BoardWorld {
    /// Creates a world over an empty store.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration is rejected.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryRecordStore::new());
        let board = BoardOrchestrator::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            BoardConfig::default(),
        )
        .expect("default board config is valid");

        Self {
            store,
            board,
            last_error: None,
        }
    }

    /// Finds a cached task by title.
    ///
    /// # Errors
    ///
    /// Returns an error when no cached task has that title.
    pub fn task_titled(&self, title: &str) -> Result<Task, eyre::Report> {
        self.board
            .snapshot()
            .tasks()
            .iter()
            .find(|task| task.title() == title)
            .cloned()
            .ok_or_else(|| eyre::eyre!("no task titled {title:?} on the board"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Parses a status name used in feature files.
///
/// # Errors
///
/// Returns an error for unknown status names.
pub fn parse_status(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
