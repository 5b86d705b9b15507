//! Reminder task entity and its lifecycle state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roost_core::{ContractId, CustomerId, DomainError, DomainResult, Entity};
use roost_customers::Channel;

use crate::payload::{PaymentReminderPayload, ReminderPayload, RenewalReminderPayload};

/// Unique reminder task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of reminder a task delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    PaymentReminder,
    RenewalReminder,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::PaymentReminder => "payment_reminder",
            TaskType::RenewalReminder => "renewal_reminder",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task execution status.
///
/// `Pending` is the only non-terminal state: it can move to `Cancelled`
/// (caller-initiated), or to `Executed`/`Failed` (set by the dispatcher
/// after a delivery attempt). Nothing transitions out of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Executed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Executed => "executed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tuple that makes repeated daily scans idempotent: no two tasks may
/// share it while the earlier one is `pending` or `executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub task_type: TaskType,
    pub customer_id: CustomerId,
    pub contract_id: Option<ContractId>,
    pub scheduled_on: NaiveDate,
}

/// A scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTask {
    id: TaskId,
    task_type: TaskType,
    customer_id: CustomerId,
    /// Absent for customer-only reminders created manually.
    contract_id: Option<ContractId>,
    /// The date the reminder should fire.
    scheduled_on: NaiveDate,
    channel: Channel,
    payload: ReminderPayload,
    status: TaskStatus,
    /// Delivery result blob (provider response or error), set on
    /// execution/failure.
    result: Option<String>,
    retry_count: u32,
    executed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReminderTask {
    /// Create a pending task. The payload kind must match `task_type`.
    pub fn new(
        task_type: TaskType,
        customer_id: CustomerId,
        contract_id: Option<ContractId>,
        scheduled_on: NaiveDate,
        channel: Channel,
        payload: ReminderPayload,
    ) -> DomainResult<Self> {
        if payload.task_type() != task_type {
            return Err(DomainError::validation(format!(
                "payload kind does not match task type {task_type}"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: TaskId::new(),
            task_type,
            customer_id,
            contract_id,
            scheduled_on,
            channel,
            payload,
            status: TaskStatus::Pending,
            result: None,
            retry_count: 0,
            executed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a pending payment reminder on the default (LINE) channel.
    pub fn payment_reminder(
        customer_id: CustomerId,
        contract_id: ContractId,
        scheduled_on: NaiveDate,
        payload: PaymentReminderPayload,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            task_type: TaskType::PaymentReminder,
            customer_id,
            contract_id: Some(contract_id),
            scheduled_on,
            channel: Channel::Line,
            payload: ReminderPayload::Payment(payload),
            status: TaskStatus::Pending,
            result: None,
            retry_count: 0,
            executed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a pending renewal reminder on the default (LINE) channel.
    pub fn renewal_reminder(
        customer_id: CustomerId,
        contract_id: ContractId,
        scheduled_on: NaiveDate,
        payload: RenewalReminderPayload,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            task_type: TaskType::RenewalReminder,
            customer_id,
            contract_id: Some(contract_id),
            scheduled_on,
            channel: Channel::Line,
            payload: ReminderPayload::Renewal(payload),
            status: TaskStatus::Pending,
            result: None,
            retry_count: 0,
            executed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_typed(&self) -> TaskId {
        self.id
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn contract_id(&self) -> Option<ContractId> {
        self.contract_id
    }

    pub fn scheduled_on(&self) -> NaiveDate {
        self.scheduled_on
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn payload(&self) -> &ReminderPayload {
        &self.payload
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            task_type: self.task_type,
            customer_id: self.customer_id,
            contract_id: self.contract_id,
            scheduled_on: self.scheduled_on,
        }
    }

    /// Whether this task should be picked up by the dispatcher.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status == TaskStatus::Pending && self.scheduled_on <= today
    }

    /// Cancel a pending task (caller-initiated, e.g. manual override).
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.ensure_pending("cancel")?;
        self.status = TaskStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark as executed after successful delivery, stamping `executed_at`.
    pub fn mark_executed(&mut self, result: Option<String>) -> DomainResult<()> {
        self.ensure_pending("execute")?;
        let now = Utc::now();
        self.status = TaskStatus::Executed;
        self.result = result;
        self.executed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Mark as failed after a delivery failure.
    ///
    /// No retry happens in this core; a dispatcher that wants one creates a
    /// fresh task rather than mutating this one.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> DomainResult<()> {
        self.ensure_pending("fail")?;
        let now = Utc::now();
        self.status = TaskStatus::Failed;
        self.result = Some(error.into());
        self.retry_count += 1;
        self.executed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_pending(&self, action: &str) -> DomainResult<()> {
        if self.status != TaskStatus::Pending {
            return Err(DomainError::invalid_transition(format!(
                "cannot {action} a {} task",
                self.status
            )));
        }
        Ok(())
    }
}

impl Entity for ReminderTask {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
