//! When steps for board lifecycle BDD scenarios.

use super::world::{BoardWorld, parse_status, run_async};
use rstest_bdd_macros::when;
use taskboard::board::{
    domain::{NewTask, TaskCategory},
    services::{DeleteConfirmation, MoveOutcome},
};

#[when(r#"the operator adds "{title}" to "{status}""#)]
fn add_task(world: &mut BoardWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let column = parse_status(&status)?;
    let result = run_async(
        world
            .board
            .create_task(NewTask::new(title, column, TaskCategory::Personal)),
    );
    world.last_error = result.err().map(|err| err.to_string());
    Ok(())
}

#[when(r#"the operator adds a task with a blank title to "{status}""#)]
fn add_blank_task(world: &mut BoardWorld, status: String) -> Result<(), eyre::Report> {
    add_task(world, "   ".to_owned(), status)
}

#[when(r#"the operator moves "{title}" to "{status}""#)]
fn move_task(world: &mut BoardWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let task = world.task_titled(&title)?;
    let target = parse_status(&status)?;
    let outcome = run_async(world.board.move_task(&task, target));
    world.last_error = match outcome {
        MoveOutcome::Failed => Some(format!("move of {title:?} failed")),
        MoveOutcome::Unchanged | MoveOutcome::Moved { .. } => None,
    };
    Ok(())
}

#[when(r#"the operator deletes "{title}""#)]
fn delete_task(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task = world.task_titled(&title)?;
    let deleted = run_async(
        world
            .board
            .delete_task(&task, DeleteConfirmation::Confirmed),
    );
    eyre::ensure!(deleted, "delete of {title:?} failed");
    Ok(())
}

#[when(r#"the operator clears the title of "{title}" and saves"#)]
fn clear_title_and_save(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task = world.task_titled(&title)?;
    world.board.open_edit(&task);
    world.board.update_draft(|draft| draft.title.clear())?;
    let result = run_async(world.board.save_edit());
    world.last_error = result.err().map(|err| err.to_string());
    Ok(())
}
