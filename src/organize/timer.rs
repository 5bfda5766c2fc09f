use super::error::StoreError;
use super::persistence::TaskRepository;
use super::state::TaskStore;
use super::types::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing changed.
    Ignored,
    /// Seconds left after this tick.
    Counting(u32),
    /// This tick reached zero.
    Completed,
}

/// Countdown over a task's duration. Knows nothing about storage.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    state: TimerState,
    total: u32,
    remaining: u32,
}

impl CountdownTimer {
    pub fn new(task: &Task) -> Self {
        let total = task.countdown_seconds();
        CountdownTimer { state: TimerState::Idle, total, remaining: total }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn start(&mut self) {
        if self.state == TimerState::Idle {
            self.state = TimerState::Running;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Completed;
            TickOutcome::Completed
        } else {
            TickOutcome::Counting(self.remaining)
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Paused => self.resume(),
            TimerState::Idle | TimerState::Completed => {}
        }
    }

    /// Back to full time and running, from any state.
    pub fn reset(&mut self) {
        self.remaining = self.total;
        self.state = TimerState::Running;
    }
}

/// A running countdown bound to one task of a store.
///
/// The session borrows the store mutably, so it cannot outlive it and no other
/// command can run while it is open. Dropping the session cancels the countdown.
#[derive(Debug)]
pub struct TimerSession<'a, R: TaskRepository> {
    store: &'a mut TaskStore<R>,
    task_id: TaskId,
    timer: CountdownTimer,
}

impl<'a, R: TaskRepository> TimerSession<'a, R> {
    /// Returns `None` if no task has this id. The countdown starts immediately.
    pub fn open(store: &'a mut TaskStore<R>, task_id: &TaskId) -> Option<Self> {
        let mut timer = CountdownTimer::new(store.get(task_id)?);
        timer.start();
        tracing::debug!(id = %task_id, seconds = timer.total(), "timer opened");
        Some(TimerSession { store, task_id: task_id.clone(), timer })
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn task(&self) -> Option<&Task> {
        self.store.get(&self.task_id)
    }

    /// On the tick that reaches zero the task is completed and saved.
    pub fn tick(&mut self) -> Result<TickOutcome, StoreError> {
        let outcome = self.timer.tick();
        if outcome == TickOutcome::Completed {
            tracing::info!(id = %self.task_id, "timer finished");
            self.store.complete(&self.task_id)?;
        }
        Ok(outcome)
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn resume(&mut self) {
        self.timer.resume();
    }

    pub fn toggle(&mut self) {
        self.timer.toggle();
    }

    /// Restarts the countdown and marks the task incomplete without saving.
    pub fn reset(&mut self) {
        self.timer.reset();
        if !self.store.mark_incomplete(&self.task_id) {
            tracing::warn!(id = %self.task_id, "task no longer in store, nothing to mark incomplete");
        }
        tracing::debug!(id = %self.task_id, "timer reset");
    }

    pub fn is_finished(&self) -> bool {
        self.timer.state() == TimerState::Completed
    }

    pub fn close(self) -> TimerState {
        tracing::debug!(id = %self.task_id, state = ?self.timer.state(), "timer closed");
        self.timer.state()
    }
}
