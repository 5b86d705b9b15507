//! Admin operations over reminder tasks: manual creation, cancellation, and
//! the listing/stats surface backing the admin console.

use chrono::NaiveDate;

use roost_core::{DomainError, DomainResult};
use roost_reminders::{ReminderTask, TaskId};

use super::store::{InsertOutcome, TaskFilter, TaskStats, TaskStore};

/// Caller-facing task operations for the surrounding application.
pub struct TaskAdmin<S: TaskStore> {
    store: S,
}

impl<S: TaskStore> TaskAdmin<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Manually create a task.
    ///
    /// Subject to the same dedup constraint as the scheduler; here a
    /// duplicate is a `Conflict` the caller should see, not a silent skip.
    pub fn create(&self, task: ReminderTask) -> DomainResult<TaskId> {
        match self.store.insert_if_absent(task)? {
            InsertOutcome::Inserted(id) => Ok(id),
            InsertOutcome::AlreadyScheduled => Err(DomainError::conflict(
                "an equivalent task is already scheduled",
            )),
        }
    }

    pub fn get(&self, id: TaskId) -> DomainResult<ReminderTask> {
        self.store.get(id)?.ok_or_else(DomainError::not_found)
    }

    /// Cancel a pending task. `NotFound` for unknown ids;
    /// `InvalidTransition` when the task is no longer pending.
    pub fn cancel(&self, id: TaskId) -> DomainResult<ReminderTask> {
        let mut task = self.get(id)?;
        task.cancel()?;
        self.store.update(&task)?;
        tracing::info!(task_id = %id, "reminder task cancelled");
        Ok(task)
    }

    pub fn list(&self, filter: &TaskFilter, limit: usize) -> DomainResult<Vec<ReminderTask>> {
        Ok(self.store.list(filter, limit)?)
    }

    pub fn stats(&self, today: NaiveDate) -> DomainResult<TaskStats> {
        Ok(self.store.stats(today)?)
    }
}
