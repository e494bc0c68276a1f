//! Unit tests for the board module.
//!
//! Tests are organised by concern: pure domain values, the relocation and
//! edit state machines, the task cache, and the orchestrating services
//! running against the in-memory record store.

mod mock_store_tests;

use crate::board::domain::{ActorId, NewTask, Task, TaskCategory, TaskStatus};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock that advances one second on every reading.
///
/// Successive records therefore carry strictly increasing timestamps, which
/// keeps ordering assertions independent of wall-clock resolution.
#[derive(Debug)]
pub(super) struct StepClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    pub(super) fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::starting_at(reference_time())
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// Fixed instant used as "now" throughout the unit tests.
pub(super) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid reference time")
}

pub(super) fn actor() -> ActorId {
    ActorId::new("robin").expect("valid actor")
}

/// Builds a task directly, bypassing the store.
pub(super) fn task_in(title: &str, status: TaskStatus) -> Task {
    Task::create(
        &NewTask::new(title, status, TaskCategory::Work),
        actor(),
        &StepClock::default(),
    )
    .expect("valid task")
}
