//! Given steps for board lifecycle BDD scenarios.

use super::world::{BoardWorld, parse_status, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::{
    adapters::memory::StoreOperation,
    domain::{NewTask, TaskCategory},
    ports::Table,
};

#[given("an empty board")]
fn empty_board(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        world.board.snapshot().tasks().is_empty(),
        "board should start empty"
    );
    Ok(())
}

#[given(r#"a task "{title}" in "{status}""#)]
fn task_in_column(
    world: &mut BoardWorld,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let column = parse_status(&status)?;
    run_async(
        world
            .board
            .create_task(NewTask::new(title, column, TaskCategory::Work)),
    )
    .wrap_err("create task for scenario setup")?;
    Ok(())
}

#[given("the record store rejects task updates")]
fn store_rejects_updates(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world
        .store
        .fail_operation(StoreOperation::Update, Table::Tasks)
        .wrap_err("inject update failure")
}
