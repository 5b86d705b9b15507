//! Reminder task storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use roost_core::{CustomerId, DomainError};
use roost_reminders::{ReminderTask, TaskId, TaskStatus, TaskType};

/// Task store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskStoreError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task storage error: {0}")]
    Storage(String),
}

impl From<TaskStoreError> for DomainError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(_) => DomainError::not_found(),
            TaskStoreError::Storage(msg) => DomainError::dependency(msg),
        }
    }
}

/// Result of a deduplicated insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(TaskId),
    /// A task with the same dedup tuple already exists in `pending` or
    /// `executed` state; nothing was inserted.
    AlreadyScheduled,
}

/// Filter for the admin task listing.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub task_type: Option<TaskType>,
    pub customer_id: Option<CustomerId>,
    pub scheduled_on: Option<NaiveDate>,
}

/// Task statistics for the admin view.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TaskStats {
    pub pending_total: usize,
    /// Pending tasks scheduled for exactly today.
    pub today_pending: usize,
    pub today_executed: usize,
    pub today_failed: usize,
}

/// Task store abstraction.
///
/// `insert_if_absent` enforces the dedup tuple
/// `(task_type, customer_id, contract_id, scheduled_on)` against `pending`
/// and `executed` tasks as a hard constraint, so concurrent scans cannot
/// double-insert; a constraint hit is an `AlreadyScheduled` outcome, not an
/// error.
pub trait TaskStore: Send + Sync {
    fn insert_if_absent(&self, task: ReminderTask) -> Result<InsertOutcome, TaskStoreError>;

    fn get(&self, task_id: TaskId) -> Result<Option<ReminderTask>, TaskStoreError>;

    fn update(&self, task: &ReminderTask) -> Result<(), TaskStoreError>;

    /// Pending tasks whose scheduled date has been reached, oldest first.
    fn due_pending(
        &self,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError>;

    /// Filtered listing for the admin view, newest scheduled date first.
    fn list(
        &self,
        filter: &TaskFilter,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError>;

    fn stats(&self, today: NaiveDate) -> Result<TaskStats, TaskStoreError>;
}

impl<S> TaskStore for Arc<S>
where
    S: TaskStore + ?Sized,
{
    fn insert_if_absent(&self, task: ReminderTask) -> Result<InsertOutcome, TaskStoreError> {
        (**self).insert_if_absent(task)
    }

    fn get(&self, task_id: TaskId) -> Result<Option<ReminderTask>, TaskStoreError> {
        (**self).get(task_id)
    }

    fn update(&self, task: &ReminderTask) -> Result<(), TaskStoreError> {
        (**self).update(task)
    }

    fn due_pending(
        &self,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError> {
        (**self).due_pending(today, limit)
    }

    fn list(
        &self,
        filter: &TaskFilter,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError> {
        (**self).list(filter, limit)
    }

    fn stats(&self, today: NaiveDate) -> Result<TaskStats, TaskStoreError> {
        (**self).stats(today)
    }
}

/// In-memory task store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, ReminderTask>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn insert_if_absent(&self, task: ReminderTask) -> Result<InsertOutcome, TaskStoreError> {
        let mut tasks = self.tasks.write().unwrap();

        let key = task.dedup_key();
        let occupied = tasks.values().any(|t| {
            t.dedup_key() == key
                && matches!(t.status(), TaskStatus::Pending | TaskStatus::Executed)
        });
        if occupied {
            return Ok(InsertOutcome::AlreadyScheduled);
        }

        let id = task.id_typed();
        tasks.insert(id, task);
        Ok(InsertOutcome::Inserted(id))
    }

    fn get(&self, task_id: TaskId) -> Result<Option<ReminderTask>, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks.get(&task_id).cloned())
    }

    fn update(&self, task: &ReminderTask) -> Result<(), TaskStoreError> {
        let mut tasks = self.tasks.write().unwrap();
        if !tasks.contains_key(&task.id_typed()) {
            return Err(TaskStoreError::NotFound(task.id_typed()));
        }
        tasks.insert(task.id_typed(), task.clone());
        Ok(())
    }

    fn due_pending(
        &self,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut result: Vec<_> = tasks
            .values()
            .filter(|t| t.is_due(today))
            .cloned()
            .collect();
        result.sort_by_key(|t| (t.scheduled_on(), t.created_at()));
        result.truncate(limit);
        Ok(result)
    }

    fn list(
        &self,
        filter: &TaskFilter,
        limit: usize,
    ) -> Result<Vec<ReminderTask>, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut result: Vec<_> = tasks
            .values()
            .filter(|t| {
                filter.status.is_none_or(|s| t.status() == s)
                    && filter.task_type.is_none_or(|k| t.task_type() == k)
                    && filter.customer_id.is_none_or(|c| t.customer_id() == c)
                    && filter.scheduled_on.is_none_or(|d| t.scheduled_on() == d)
            })
            .cloned()
            .collect();
        result.sort_by_key(|t| (std::cmp::Reverse(t.scheduled_on()), t.created_at()));
        result.truncate(limit);
        Ok(result)
    }

    fn stats(&self, today: NaiveDate) -> Result<TaskStats, TaskStoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut stats = TaskStats::default();

        for task in tasks.values() {
            match task.status() {
                TaskStatus::Pending => {
                    stats.pending_total += 1;
                    if task.scheduled_on() == today {
                        stats.today_pending += 1;
                    }
                }
                TaskStatus::Executed => {
                    if task.executed_at().is_some_and(|at| at.date_naive() == today) {
                        stats.today_executed += 1;
                    }
                }
                TaskStatus::Failed => {
                    if task.executed_at().is_some_and(|at| at.date_naive() == today) {
                        stats.today_failed += 1;
                    }
                }
                TaskStatus::Cancelled => {}
            }
        }

        Ok(stats)
    }
}
