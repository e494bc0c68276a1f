//! In-memory integration tests for change notifications between views.

use std::sync::Arc;

use super::helpers::{SETTLE_TIMEOUT, eventually, open_board, seed_task, store};
use rstest::rstest;
use taskboard::board::{
    adapters::memory::InMemoryRecordStore,
    domain::TaskStatus,
    ports::{ChangeKind, Table},
};
use tokio::sync::mpsc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_create_reaches_a_listening_view(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let local = open_board(&store, "robin")?;
    let remote = open_board(&store, "sam")?;
    local.start_listening()?;

    let task = seed_task(&remote, "Water plants", TaskStatus::Todo).await?;

    eyre::ensure!(
        eventually(|| local.cache().find(task.id()).is_some()).await,
        "remote task never reached the listening view"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_move_and_delete_are_mirrored(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let local = open_board(&store, "robin")?;
    let remote = open_board(&store, "sam")?;
    let task = seed_task(&local, "Water plants", TaskStatus::Todo).await?;
    local.start_listening()?;

    let outcome = remote.move_task(&task, TaskStatus::Done).await;
    eyre::ensure!(outcome.is_moved(), "remote move failed: {outcome:?}");
    eyre::ensure!(
        eventually(|| {
            local
                .cache()
                .find(task.id())
                .is_some_and(|cached| cached.status() == TaskStatus::Done)
        })
        .await,
        "remote move never reached the listening view"
    );

    let moved = local
        .cache()
        .find(task.id())
        .ok_or_else(|| eyre::eyre!("task missing from cache"))?;
    eyre::ensure!(
        remote
            .delete_task(&moved, taskboard::board::services::DeleteConfirmation::Confirmed)
            .await,
        "remote delete failed"
    );
    eyre::ensure!(
        eventually(|| local.cache().find(task.id()).is_none()).await,
        "remote delete never reached the listening view"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pushed_refresh_leaves_the_open_draft_alone(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let local = open_board(&store, "robin")?;
    let remote = open_board(&store, "sam")?;
    let task = seed_task(&local, "Water plants", TaskStatus::Todo).await?;
    local.start_listening()?;
    local.open_edit(&task);
    local.update_draft(|draft| draft.title = "Water plants daily".to_owned())?;

    let outcome = remote.move_task(&task, TaskStatus::Done).await;
    eyre::ensure!(outcome.is_moved(), "remote move failed: {outcome:?}");
    eyre::ensure!(
        eventually(|| {
            local
                .cache()
                .find(task.id())
                .is_some_and(|cached| cached.status() == TaskStatus::Done)
        })
        .await,
        "remote move never reached the listening view"
    );

    let session = local
        .edit_session()
        .ok_or_else(|| eyre::eyre!("edit session closed by refresh"))?;
    eyre::ensure!(session.original() == &task, "seed snapshot was replaced");
    eyre::ensure!(session.draft().title == "Water plants daily");
    eyre::ensure!(session.draft().status == TaskStatus::Todo);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_inserts_bump_the_revision(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let local = open_board(&store, "robin")?;
    let remote = open_board(&store, "sam")?;
    local.start_listening()?;
    let mut revision = local.activity_revision();
    let before = *revision.borrow_and_update();

    let _task = seed_task(&remote, "Water plants", TaskStatus::Todo).await?;

    tokio::time::timeout(SETTLE_TIMEOUT, revision.changed()).await??;
    eyre::ensure!(
        *revision.borrow() > before,
        "activity revision did not advance"
    );
    eyre::ensure!(
        local.activity_feed(None).await.len() == 1,
        "listening view should read the remote activity record"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn close_releases_subscriptions(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let local = open_board(&store, "robin")?;
    local.start_listening()?;
    eyre::ensure!(store.subscriber_count() == 2, "expected two subscriptions");

    local.close();

    eyre::ensure!(
        eventually(|| store.subscriber_count() == 0).await,
        "subscriptions outlived the closed view"
    );
    let remote = open_board(&store, "sam")?;
    let task = seed_task(&remote, "Late arrival", TaskStatus::Todo).await?;
    eyre::ensure!(
        local.cache().find(task.id()).is_none(),
        "closed view must not refresh"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn detail_watch_only_sees_its_own_task(
    store: Arc<InMemoryRecordStore>,
) -> Result<(), eyre::Report> {
    let board = open_board(&store, "robin")?;
    let watched = seed_task(&board, "Plan trip", TaskStatus::Todo).await?;
    let other = seed_task(&board, "Write report", TaskStatus::Todo).await?;
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let _detail = board.watch_task_detail(watched.id(), move |notification| {
        sender.send(notification).ok();
    })?;

    board.add_comment(other.id(), "Unrelated").await?;
    board.add_comment(watched.id(), "Booked flights").await?;

    let notification = tokio::time::timeout(SETTLE_TIMEOUT, receiver.recv())
        .await?
        .ok_or_else(|| eyre::eyre!("detail watch closed"))?;
    eyre::ensure!(
        notification.table == Table::TaskComments,
        "unexpected table {}",
        notification.table
    );
    eyre::ensure!(
        notification.kind == ChangeKind::Insert,
        "unexpected kind {:?}",
        notification.kind
    );
    let content = notification
        .record
        .as_ref()
        .and_then(|record| record.get("content"))
        .and_then(|value| value.as_str());
    eyre::ensure!(
        content == Some("Booked flights"),
        "unexpected comment {content:?}"
    );
    eyre::ensure!(receiver.try_recv().is_err(), "unexpected extra notification");
    Ok(())
}
