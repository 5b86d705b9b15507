//! Typed reminder payloads.
//!
//! A closed set of per-task-type records rather than an open map, so the
//! dispatcher can consume them without reflection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::TaskType;

/// Payload of a payment reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReminderPayload {
    pub customer_name: String,
    pub company_name: Option<String>,
    pub contract_name: String,
    /// The due date being reminded about.
    pub due_on: NaiveDate,
    /// Amount due, in the smallest currency unit.
    pub amount: u64,
    /// Reminder offset this task was created for (7 or 3).
    pub days_before: u32,
    /// Rendered message text, ready for delivery.
    pub message: String,
}

/// Payload of a renewal reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalReminderPayload {
    pub customer_name: String,
    pub company_name: Option<String>,
    pub contract_name: String,
    /// The contract expiry date being reminded about.
    pub ends_on: NaiveDate,
    /// Days between the trigger date and expiry (60 or 30).
    pub days_remaining: u32,
    /// Rendered message text, ready for delivery.
    pub message: String,
}

/// Structured message data carried by a reminder task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderPayload {
    Payment(PaymentReminderPayload),
    Renewal(RenewalReminderPayload),
}

impl ReminderPayload {
    /// The task type this payload belongs to.
    pub fn task_type(&self) -> TaskType {
        match self {
            ReminderPayload::Payment(_) => TaskType::PaymentReminder,
            ReminderPayload::Renewal(_) => TaskType::RenewalReminder,
        }
    }

    /// The rendered message text to deliver.
    pub fn message(&self) -> &str {
        match self {
            ReminderPayload::Payment(p) => &p.message,
            ReminderPayload::Renewal(p) => &p.message,
        }
    }
}
