//! Reminder task infrastructure: storage contract, daily scan scheduler,
//! dispatcher, and admin operations.

pub mod admin;
pub mod dispatcher;
pub mod scheduler;
pub mod store;

pub use admin::TaskAdmin;
pub use dispatcher::{
    ChannelError, DispatchOutcome, DispatcherConfig, MessagingChannel, TaskDispatcher,
};
pub use scheduler::{
    ReminderScheduler, ScanOutcome, PAYMENT_REMINDER_OFFSETS_DAYS,
    RENEWAL_REMINDER_OFFSETS_DAYS,
};
pub use store::{InMemoryTaskStore, InsertOutcome, TaskFilter, TaskStats, TaskStore, TaskStoreError};
