use chrono::Weekday;

use super::error::StoreError;
use super::persistence::TaskRepository;
use super::state::TaskStore;
use super::types::{weekday_code, Category};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverState {
    /// The marker already names today.
    Fresh,
    /// The marker is absent or names another day.
    Stale,
}

impl<R: TaskRepository> TaskStore<R> {
    pub fn rollover_state(&self, today: Weekday) -> RolloverState {
        match self.repository.last_reset_day() {
            Some(marker) if marker == weekday_code(today) => RolloverState::Fresh,
            _ => RolloverState::Stale,
        }
    }

    /// Clears completion on daily tasks once per day. Returns the state seen before acting.
    ///
    /// The marker is written only after the tasks are saved, so a failed save is
    /// retried on the next activation.
    pub fn reset_daily(&mut self, today: Weekday) -> Result<RolloverState, StoreError> {
        let state = self.rollover_state(today);
        if state == RolloverState::Fresh {
            return Ok(state);
        }

        let previous = self.tasks.clone();
        let mut cleared = 0;
        for task in self.tasks.iter_mut().filter(|task| task.category() == Category::Daily) {
            if task.is_completed {
                task.is_completed = false;
                cleared += 1;
            }
        }
        self.commit(previous)?;
        self.repository.set_last_reset_day(weekday_code(today))?;
        tracing::info!(day = weekday_code(today), cleared, "daily tasks reset");
        Ok(state)
    }

    /// What runs each time the app comes to the foreground.
    pub fn activate(&mut self, today: Weekday) -> Result<RolloverState, StoreError> {
        self.load();
        self.reset_daily(today)
    }
}
