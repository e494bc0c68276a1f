//! Then steps for board lifecycle BDD scenarios.

use super::world::{BoardWorld, parse_status, run_async};
use rstest_bdd_macros::then;

#[then(r#""{title}" appears in "{status}""#)]
fn task_appears_in(world: &BoardWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let actual = world.board.columns().status_of(&title);
    eyre::ensure!(
        actual == Some(expected),
        "expected {title:?} in {expected}, found {actual:?}"
    );
    Ok(())
}

#[then(r#""{title}" is not on the board"#)]
fn task_is_not_on_board(world: &BoardWorld, title: String) -> Result<(), eyre::Report> {
    let actual = world.board.columns().status_of(&title);
    eyre::ensure!(actual.is_none(), "{title:?} is still in {actual:?}");
    Ok(())
}

#[then(r#"the latest activity is "{kind}" for "{title}""#)]
fn latest_activity_is(world: &BoardWorld, kind: String, title: String) -> Result<(), eyre::Report> {
    let feed = run_async(world.board.activity_feed(Some(1)));
    let latest = feed
        .first()
        .ok_or_else(|| eyre::eyre!("activity feed is empty"))?;
    eyre::ensure!(
        latest.activity_type().as_str() == kind,
        "expected {kind}, found {}",
        latest.activity_type()
    );
    eyre::ensure!(
        latest.task_title() == title,
        "expected title {title:?}, found {:?}",
        latest.task_title()
    );
    Ok(())
}

#[then(r#"the board reports "{message}""#)]
fn board_reports(world: &BoardWorld, message: String) -> Result<(), eyre::Report> {
    let reported = world
        .last_error
        .as_deref()
        .ok_or_else(|| eyre::eyre!("no error was reported"))?;
    eyre::ensure!(
        reported == message,
        "expected {message:?}, found {reported:?}"
    );
    Ok(())
}

#[then("the activity feed holds {count:usize} entries")]
fn activity_feed_holds(world: &BoardWorld, count: usize) -> Result<(), eyre::Report> {
    let feed = run_async(world.board.activity_feed(None));
    eyre::ensure!(
        feed.len() == count,
        "expected {count} activity entries, found {}",
        feed.len()
    );
    Ok(())
}

#[then(r#"the edit session stays open with "{message}""#)]
fn edit_session_stays_open(world: &BoardWorld, message: String) -> Result<(), eyre::Report> {
    let session = world
        .board
        .edit_session()
        .ok_or_else(|| eyre::eyre!("edit session was closed"))?;
    eyre::ensure!(
        session.error() == Some(message.as_str()),
        "expected inline error {message:?}, found {:?}",
        session.error()
    );
    eyre::ensure!(!session.is_saving(), "session still marked as saving");
    Ok(())
}
