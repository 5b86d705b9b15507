//! Reminder task domain module.
//!
//! Defines the reminder task entity and its lifecycle state machine, the
//! closed set of typed message payloads, the deduplication key that keeps
//! daily scans idempotent, and the message templates.

pub mod payload;
pub mod task;
pub mod template;

pub use payload::{PaymentReminderPayload, ReminderPayload, RenewalReminderPayload};
pub use task::{DedupKey, ReminderTask, TaskId, TaskStatus, TaskType};
pub use template::{payment_reminder_message, renewal_reminder_message};
