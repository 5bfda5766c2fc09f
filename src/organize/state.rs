use std::collections::HashSet;

use chrono::Weekday;

use super::error::StoreError;
use super::persistence::TaskRepository;
use super::types::*;

/// The in-memory owner of every task, across all categories.
///
/// Mutating commands persist through the repository before returning; nothing
/// else writes to storage.
#[derive(Debug)]
pub struct TaskStore<R: TaskRepository> {
    pub(crate) repository: R,
    pub(crate) tasks: Vec<Task>,
}

impl<R: TaskRepository> TaskStore<R> {
    pub fn new(repository: R) -> Self {
        TaskStore { repository, tasks: Vec::new() }
    }

    /// Creates a store and fills it from the repository.
    pub fn open(repository: R) -> Self {
        let mut store = TaskStore::new(repository);
        store.load();
        store
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    pub fn load(&mut self) {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        for category in Category::ALL {
            for task in self.repository.load(category) {
                if seen.insert(task.id().clone()) {
                    tasks.push(task);
                } else {
                    tracing::warn!(id = %task.id(), category = %category, "skipping duplicate task id");
                }
            }
        }
        tracing::debug!(count = tasks.len(), "tasks loaded");
        self.tasks = tasks;
    }

    /// Writes every category, empty ones included, so stale entries get cleared.
    pub fn save(&mut self) -> Result<(), StoreError> {
        for category in Category::ALL {
            let partition: Vec<Task> = self.tasks.iter()
                .filter(|task| task.category() == category)
                .cloned()
                .collect();
            self.repository.save(category, &partition).map_err(|e| {
                tracing::error!(category = %category, error = %e, "failed to save tasks");
                e
            })?;
        }
        Ok(())
    }

    pub fn add(&mut self, title: &str, duration: &str, category: Category) -> Result<TaskId, StoreError> {
        let task = parse_duration(duration)
            .and_then(|minutes| Task::new(title, minutes, category))
            .map_err(|e| {
                tracing::warn!(title, duration, error = %e, "rejected new task");
                e
            })?;
        let id = task.id().clone();
        tracing::debug!(id = %id, category = %category, "adding task");
        let previous = self.tasks.clone();
        self.tasks.push(task);
        self.commit(previous)?;
        Ok(id)
    }

    /// Returns whether a task with this id existed.
    pub fn remove(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.tasks.clone();
        let task = self.tasks.remove(index);
        tracing::debug!(id = %id, title = task.title(), "removed task");
        self.commit(previous)?;
        Ok(true)
    }

    /// Returns whether a task with this id existed.
    pub fn complete(&mut self, id: &TaskId) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.tasks.clone();
        self.tasks[index].is_completed = true;
        tracing::debug!(id = %id, "task completed");
        self.commit(previous)?;
        Ok(true)
    }

    /// Clears the completion flag in memory only. The next save carries it.
    pub(crate) fn mark_incomplete(&mut self, id: &TaskId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.tasks[index].is_completed = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Daily tasks followed by the tasks bound to `weekday`.
    pub fn today_tasks(&self, weekday: Weekday) -> Vec<&Task> {
        let daily = self.tasks.iter().filter(|task| task.category() == Category::Daily);
        let weekly = self.tasks.iter().filter(|task| task.category() == Category::Weekly(weekday));
        daily.chain(weekly).collect()
    }

    pub fn tasks_in(&self, category: Category) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.category() == category).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Saves, or puts `previous` back if the write fails.
    pub(crate) fn commit(&mut self, previous: Vec<Task>) -> Result<(), StoreError> {
        self.save().map_err(|e| {
            self.tasks = previous;
            e
        })
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}
