//! In-memory integration tests for the task lifecycle and its audit trail.

use std::sync::Arc;

use super::helpers::{open_board, seed_task, store};
use rstest::rstest;
use taskboard::board::{
    adapters::memory::{InMemoryRecordStore, StoreOperation},
    domain::{ActivityType, DragInput, TaskPriority, TaskStatus},
    ports::Table,
    services::{DeleteConfirmation, MoveOutcome},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_leaves_a_complete_audit_trail(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let board = open_board(&store, "robin")?;
    let task = seed_task(&board, "Draft proposal", TaskStatus::Todo).await?;

    let started = board.move_task(&task, TaskStatus::InProgress).await;
    eyre::ensure!(started.is_moved(), "move to in progress failed: {started:?}");
    let moved = board
        .cache()
        .find(task.id())
        .ok_or_else(|| eyre::eyre!("task missing from cache after move"))?;
    board.open_edit(&moved);
    board.update_draft(|draft| draft.priority = TaskPriority::High)?;
    board.save_edit().await?;
    let edited = board
        .cache()
        .find(task.id())
        .ok_or_else(|| eyre::eyre!("task missing from cache after edit"))?;
    let finished = board.move_task(&edited, TaskStatus::Done).await;
    eyre::ensure!(finished.is_moved(), "move to done failed: {finished:?}");
    let done = board
        .cache()
        .find(task.id())
        .ok_or_else(|| eyre::eyre!("task missing from cache before delete"))?;
    eyre::ensure!(
        board
            .delete_task(&done, DeleteConfirmation::Confirmed)
            .await,
        "delete failed"
    );

    let history: Vec<ActivityType> = board
        .task_history(task.id(), None)
        .await
        .iter()
        .map(|record| record.activity_type().clone())
        .collect();
    eyre::ensure!(
        history
            == vec![
                ActivityType::TaskDeleted,
                ActivityType::TaskCompleted,
                ActivityType::TaskUpdated,
                ActivityType::TaskMoved,
                ActivityType::TaskCreated,
            ],
        "unexpected history {history:?}"
    );
    eyre::ensure!(
        board.cache().find(task.id()).is_none(),
        "deleted task still cached"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_moves_both_land(store: Arc<InMemoryRecordStore>) -> Result<(), eyre::Report> {
    let board = open_board(&store, "robin")?;
    let report = seed_task(&board, "Write report", TaskStatus::Todo).await?;
    let trip = seed_task(&board, "Plan trip", TaskStatus::InProgress).await?;

    let (first, second) = tokio::join!(
        board.move_task(&report, TaskStatus::InProgress),
        board.move_task(&trip, TaskStatus::Done),
    );

    eyre::ensure!(
        first.is_moved() && second.is_moved(),
        "moves failed: {first:?}, {second:?}"
    );
    let columns = board.columns();
    eyre::ensure!(
        columns.status_of("Write report") == Some(TaskStatus::InProgress),
        "report not in progress"
    );
    eyre::ensure!(
        columns.status_of("Plan trip") == Some(TaskStatus::Done),
        "trip not done"
    );
    let moves = board
        .activity_feed(None)
        .await
        .iter()
        .filter(|record| {
            matches!(
                record.activity_type(),
                ActivityType::TaskMoved | ActivityType::TaskCompleted
            )
        })
        .count();
    eyre::ensure!(moves == 2, "expected two move records, found {moves}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn swipe_moves_one_column(store: Arc<InMemoryRecordStore>) -> Result<(), eyre::Report> {
    let board = open_board(&store, "robin")?;
    let task = seed_task(&board, "Book dentist", TaskStatus::InProgress).await?;

    let _touch = board
        .handle_drag(DragInput::TouchStart {
            task: task.clone(),
            x: 300,
        })
        .await;
    let _moved = board.handle_drag(DragInput::TouchMove { x: 150 }).await;
    let outcome = board.handle_drag(DragInput::TouchEnd).await;

    eyre::ensure!(
        outcome
            == MoveOutcome::Moved {
                activity_recorded: true
            },
        "unexpected outcome {outcome:?}"
    );
    eyre::ensure!(
        board.columns().status_of("Book dentist") == Some(TaskStatus::Todo),
        "swipe left did not retreat one column"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_outage_never_blocks_task_writes(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let board = open_board(&store, "robin")?;
    store.fail_operation(StoreOperation::Insert, Table::ActivityLogs)?;

    let task = seed_task(&board, "Pay rent", TaskStatus::Todo).await?;
    let outcome = board.move_task(&task, TaskStatus::Done).await;

    eyre::ensure!(
        outcome
            == MoveOutcome::Moved {
                activity_recorded: false
            },
        "unexpected outcome {outcome:?}"
    );
    eyre::ensure!(
        board.columns().status_of("Pay rent") == Some(TaskStatus::Done),
        "task not moved"
    );
    store.clear_failures()?;
    eyre::ensure!(
        board.activity_feed(None).await.is_empty(),
        "no activity should have been written"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_is_attributed_to_the_configured_actor(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let robin = open_board(&store, "robin")?;
    let sam = open_board(&store, "sam")?;
    let task = seed_task(&robin, "Renew passport", TaskStatus::Todo).await?;
    eyre::ensure!(sam.refresh().await, "second view failed to refresh");

    let outcome = sam.move_task(&task, TaskStatus::InProgress).await;
    eyre::ensure!(outcome.is_moved(), "move failed: {outcome:?}");

    let actors: Vec<String> = robin
        .task_history(task.id(), None)
        .await
        .iter()
        .map(|record| record.created_by().as_str().to_owned())
        .collect();
    eyre::ensure!(
        actors == vec!["sam".to_owned(), "robin".to_owned()],
        "unexpected actors {actors:?}"
    );
    Ok(())
}
