//! Task dispatcher: delivers due reminder tasks over the messaging channel
//! and drives the `pending → executed/failed` transitions.

use chrono::{DateTime, Utc};

use roost_core::DomainResult;
use roost_reminders::ReminderTask;

use crate::stores::CustomerStore;

use super::store::TaskStore;

/// Outbound messaging channel (e.g. the LINE push API behind an adapter).
pub trait MessagingChannel: Send + Sync {
    /// Push a text message to a channel identity. Returns the provider's
    /// response body on success.
    fn push_text(&self, to: &str, body: &str) -> Result<String, ChannelError>;
}

/// Message delivery failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("message delivery failed: {0}")]
pub struct ChannelError(pub String);

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum tasks handled per run.
    pub limit: usize,
    /// Report what would be sent without sending or mutating anything.
    pub dry_run: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            dry_run: false,
        }
    }
}

impl DispatcherConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Result of one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchOutcome {
    pub executed: usize,
    pub failed: usize,
    /// Tasks whose customer could not be resolved to a channel identity
    /// (marked failed unless dry-running).
    pub skipped: usize,
}

/// Delivers due pending tasks.
///
/// Expected to run once per day after the scan. Retry policy is not defined
/// here: a failed task stays failed, and a fresh task can be created for
/// another attempt.
pub struct TaskDispatcher<S: TaskStore, D: CustomerStore, M: MessagingChannel> {
    tasks: S,
    customers: D,
    channel: M,
    config: DispatcherConfig,
}

impl<S: TaskStore, D: CustomerStore, M: MessagingChannel> TaskDispatcher<S, D, M> {
    pub fn new(tasks: S, customers: D, channel: M) -> Self {
        Self {
            tasks,
            customers,
            channel,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Deliver every task due as of `now`.
    pub fn run_due(&self, now: DateTime<Utc>) -> DomainResult<DispatchOutcome> {
        let today = now.date_naive();
        let due = self.tasks.due_pending(today, self.config.limit)?;
        let mut outcome = DispatchOutcome::default();

        for mut task in due {
            let customer = self.customers.customer(task.customer_id())?;
            let identity = customer
                .as_ref()
                .and_then(|c| c.channel_identity(task.channel()))
                .map(str::to_string);

            let Some(identity) = identity else {
                outcome.skipped += 1;
                tracing::warn!(
                    task_id = %task.id_typed(),
                    customer_id = %task.customer_id(),
                    "skipping reminder task: customer has no channel identity"
                );
                if !self.config.dry_run {
                    task.mark_failed("customer has no channel identity")?;
                    self.tasks.update(&task)?;
                }
                continue;
            };

            if self.config.dry_run {
                tracing::info!(
                    task_id = %task.id_typed(),
                    to = %identity,
                    "dry run: would send reminder"
                );
                outcome.executed += 1;
                continue;
            }

            match self.channel.push_text(&identity, task.payload().message()) {
                Ok(response) => {
                    self.record_execution(&mut task, now, &identity, &response)?;
                    outcome.executed += 1;
                }
                Err(err) => {
                    tracing::error!(
                        task_id = %task.id_typed(),
                        customer_id = %task.customer_id(),
                        error = %err,
                        "reminder delivery failed"
                    );
                    task.mark_failed(err.to_string())?;
                    self.tasks.update(&task)?;
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn record_execution(
        &self,
        task: &mut ReminderTask,
        now: DateTime<Utc>,
        identity: &str,
        response: &str,
    ) -> DomainResult<()> {
        let result = serde_json::json!({
            "sent_at": now.to_rfc3339(),
            "to": identity,
            "response": response,
        })
        .to_string();
        task.mark_executed(Some(result))?;
        self.tasks.update(task)?;
        tracing::info!(
            task_id = %task.id_typed(),
            task_type = %task.task_type(),
            customer_id = %task.customer_id(),
            "reminder delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryCrmStore;
    use crate::tasks::store::{InMemoryTaskStore, InsertOutcome, TaskStore};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use roost_core::{BranchId, ContractId, CustomerId};
    use roost_customers::Customer;
    use roost_reminders::{
        payment_reminder_message, PaymentReminderPayload, ReminderTask, TaskStatus,
    };

    /// Recording fake for the messaging channel.
    #[derive(Default)]
    struct FakeChannel {
        sent: Mutex<Vec<(String, String)>>,
        fail: AtomicBool,
    }

    impl FakeChannel {
        fn failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    impl MessagingChannel for FakeChannel {
        fn push_text(&self, to: &str, body: &str) -> Result<String, ChannelError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ChannelError("HTTP 500".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok("{\"status\":\"ok\"}".to_string())
        }
    }

    impl MessagingChannel for Arc<FakeChannel> {
        fn push_text(&self, to: &str, body: &str) -> Result<String, ChannelError> {
            (**self).push_text(to, body)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_task(
        tasks: &InMemoryTaskStore,
        crm: &InMemoryCrmStore,
        line_id: Option<&str>,
        scheduled_on: NaiveDate,
    ) -> roost_reminders::TaskId {
        let mut customer =
            Customer::new(CustomerId::new(), BranchId::new(), "Ada Chen").unwrap();
        if let Some(line_id) = line_id {
            customer = customer.with_line_user_id(line_id);
        }
        let customer_id = customer.id_typed();
        crm.insert_customer(customer);

        let due_on = scheduled_on + chrono::Duration::days(7);
        let task = ReminderTask::payment_reminder(
            customer_id,
            ContractId::new(),
            scheduled_on,
            PaymentReminderPayload {
                customer_name: "Ada Chen".to_string(),
                company_name: None,
                contract_name: "Hot desk A-12".to_string(),
                due_on,
                amount: 12_000,
                days_before: 7,
                message: payment_reminder_message("Ada Chen", None, due_on, 12_000),
            },
        );
        match tasks.insert_if_absent(task).unwrap() {
            InsertOutcome::Inserted(id) => id,
            InsertOutcome::AlreadyScheduled => panic!("unexpected dedup hit"),
        }
    }

    fn test_now() -> DateTime<Utc> {
        "2024-06-08T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn delivers_due_task_and_marks_executed() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        let id = seed_task(&tasks, &crm, Some("U123"), date(2024, 6, 8));

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel.clone());
        let outcome = dispatcher.run_due(test_now()).unwrap();

        assert_eq!(outcome.executed, 1);
        assert_eq!(outcome.failed, 0);

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "U123");
        assert!(sent[0].1.contains("[Payment Reminder]"));

        let task = tasks.get(id).unwrap().unwrap();
        assert_eq!(task.status(), TaskStatus::Executed);
        assert!(task.executed_at().is_some());
        assert!(task.result().unwrap().contains("\"to\":\"U123\""));
    }

    #[test]
    fn future_tasks_are_left_alone() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        let id = seed_task(&tasks, &crm, Some("U123"), date(2024, 6, 20));

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel);
        let outcome = dispatcher.run_due(test_now()).unwrap();

        assert_eq!(outcome, DispatchOutcome::default());
        assert_eq!(tasks.get(id).unwrap().unwrap().status(), TaskStatus::Pending);
    }

    #[test]
    fn delivery_failure_marks_task_failed() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        channel.failing(true);
        let id = seed_task(&tasks, &crm, Some("U123"), date(2024, 6, 8));

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel);
        let outcome = dispatcher.run_due(test_now()).unwrap();

        assert_eq!(outcome.failed, 1);
        let task = tasks.get(id).unwrap().unwrap();
        assert_eq!(task.status(), TaskStatus::Failed);
        assert_eq!(task.retry_count(), 1);
        assert!(task.result().unwrap().contains("HTTP 500"));
    }

    #[test]
    fn missing_channel_identity_marks_task_failed() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        let id = seed_task(&tasks, &crm, None, date(2024, 6, 8));

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel.clone());
        let outcome = dispatcher.run_due(test_now()).unwrap();

        assert_eq!(outcome.skipped, 1);
        assert!(channel.sent.lock().unwrap().is_empty());
        assert_eq!(tasks.get(id).unwrap().unwrap().status(), TaskStatus::Failed);
    }

    #[test]
    fn dry_run_sends_and_mutates_nothing() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        let id = seed_task(&tasks, &crm, Some("U123"), date(2024, 6, 8));

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel.clone())
            .with_config(DispatcherConfig::default().dry_run());
        let outcome = dispatcher.run_due(test_now()).unwrap();

        assert_eq!(outcome.executed, 1);
        assert!(channel.sent.lock().unwrap().is_empty());
        assert_eq!(tasks.get(id).unwrap().unwrap().status(), TaskStatus::Pending);
    }

    #[test]
    fn limit_caps_tasks_per_run() {
        let tasks = InMemoryTaskStore::arc();
        let crm = InMemoryCrmStore::arc();
        let channel = Arc::new(FakeChannel::default());
        for _ in 0..3 {
            seed_task(&tasks, &crm, Some("U123"), date(2024, 6, 8));
        }

        let dispatcher = TaskDispatcher::new(tasks.clone(), crm, channel)
            .with_config(DispatcherConfig::default().with_limit(2));
        let outcome = dispatcher.run_due(test_now()).unwrap();
        assert_eq!(outcome.executed, 2);
    }
}
