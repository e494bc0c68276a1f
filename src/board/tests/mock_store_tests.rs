//! Interaction tests that pin exactly which record store calls a board
//! operation makes.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use super::{StepClock, actor, task_in};
use crate::board::{
    adapters::rows,
    domain::{NewTask, TaskCategory, TaskId, TaskPatch, TaskStatus},
    ports::{
        ChangeSubscription, Record, RecordFilter, RecordStore, RecordStoreError,
        RecordStoreResult, SelectQuery, SubscribeRequest, Table,
    },
    services::{BoardOrchestrator, MoveOutcome, TaskStoreClient, TaskStoreError},
};
use crate::config::BoardConfig;
use async_trait::async_trait;
use mockall::{Sequence, mock};
use rstest::rstest;

mock! {
    pub Store {}

    #[async_trait]
    impl RecordStore for Store {
        async fn select(&self, table: Table, query: SelectQuery) -> RecordStoreResult<Vec<Record>>;
        async fn insert(
            &self,
            table: Table,
            records: Vec<Record>,
        ) -> RecordStoreResult<Vec<Record>>;
        async fn update(
            &self,
            table: Table,
            filter: RecordFilter,
            fields: Record,
        ) -> RecordStoreResult<usize>;
        async fn delete(&self, table: Table, filter: RecordFilter) -> RecordStoreResult<usize>;
        fn subscribe(&self, request: SubscribeRequest) -> RecordStoreResult<ChangeSubscription>;
    }
}

fn client(store: MockStore) -> TaskStoreClient<MockStore, StepClock> {
    TaskStoreClient::new(Arc::new(store), Arc::new(StepClock::default()), actor())
}

fn board(store: MockStore) -> BoardOrchestrator<MockStore, StepClock> {
    BoardOrchestrator::new(
        Arc::new(store),
        Arc::new(StepClock::default()),
        BoardConfig::default(),
    )
    .expect("default config is valid")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_title_never_reaches_the_store() {
    let mut store = MockStore::new();
    store.expect_insert().never();

    let result = client(store)
        .create(&NewTask::new(" ", TaskStatus::Todo, TaskCategory::Work))
        .await;

    assert!(matches!(result, Err(TaskStoreError::Validation(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_insert_is_a_validation_rejection() {
    let mut store = MockStore::new();
    store
        .expect_insert()
        .times(1)
        .returning(|table, _| Err(RecordStoreError::rejected(table, "check constraint")));

    let result = client(store)
        .create(&NewTask::new("Plan trip", TaskStatus::Todo, TaskCategory::Work))
        .await;

    assert!(matches!(result, Err(TaskStoreError::ValidationRejected(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_matching_no_row_is_not_found() {
    let mut store = MockStore::new();
    store
        .expect_update()
        .withf(|table, _, _| *table == Table::Tasks)
        .times(1)
        .returning(|_, _, _| Ok(0));
    let id = TaskId::new();

    let result = client(store)
        .update_fields(id, &TaskPatch::status(TaskStatus::Done))
        .await;

    assert!(matches!(result, Err(TaskStoreError::NotFound(missing)) if missing == id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_status_move_makes_no_store_call() {
    let mut store = MockStore::new();
    store.expect_update().never();
    store.expect_insert().never();
    store.expect_select().never();
    let task = task_in("Write report", TaskStatus::Done);

    let outcome = board(store).move_task(&task, TaskStatus::Done).await;

    assert_eq!(outcome, MoveOutcome::Unchanged);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_is_written_only_after_the_task_write() {
    let mut store = MockStore::new();
    let mut sequence = Sequence::new();
    store
        .expect_update()
        .withf(|table, _, fields| {
            *table == Table::Tasks && fields.get("status").and_then(|v| v.as_str()) == Some("done")
        })
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _, _| Ok(1));
    store
        .expect_insert()
        .withf(|table, records| *table == Table::ActivityLogs && records.len() == 1)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, records| Ok(records));
    store
        .expect_select()
        .withf(|table, _| *table == Table::Tasks)
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(Vec::new()));
    let task = task_in("Write report", TaskStatus::InProgress);

    let outcome = board(store).move_task(&task, TaskStatus::Done).await;

    assert_eq!(
        outcome,
        MoveOutcome::Moved {
            activity_recorded: true
        }
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_task_write_skips_activity_and_refresh() {
    let mut store = MockStore::new();
    store.expect_update().times(1).returning(|_, _, _| {
        Err(RecordStoreError::unavailable(std::io::Error::other(
            "connection reset",
        )))
    });
    store.expect_insert().never();
    store.expect_select().never();
    let task = task_in("Write report", TaskStatus::Todo);

    let outcome = board(store).move_task(&task, TaskStatus::InProgress).await;

    assert_eq!(outcome, MoveOutcome::Failed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_completing_after_close_leaves_cache_untouched() {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let late_row =
        rows::task_to_record(&task_in("Arrived late", TaskStatus::Todo)).expect("encodable task");
    let mut store = MockStore::new();
    store.expect_select().times(1).returning(move |_, _| {
        started_tx.send(()).expect("test awaits the fetch");
        release_rx.recv().expect("test releases the fetch");
        Ok(vec![late_row.clone()])
    });
    let board = board(store);

    let pending = board.spawn_refresh();
    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("fetch reached the store");
    board.close();
    release_tx.send(()).expect("fetch still waiting");

    assert!(!pending.await.expect("refresh task joins"));
    let snapshot = board.snapshot();
    assert!(snapshot.tasks().is_empty());
    assert_eq!(snapshot.sequence(), 0);
}
