//! Infrastructure layer: collaborator store abstractions, the reminder scan
//! scheduler and task dispatcher, and the cached dashboard aggregation
//! engine.

pub mod dashboard;
pub mod scope;
pub mod stores;
pub mod tasks;


pub use dashboard::{
    DashboardEngine, InMemorySummaryCache, MonthRow, MonthlySummary, SummaryCache,
    SUMMARY_CACHE_TTL,
};
pub use scope::BranchScope;
pub use stores::{
    ContractStore, CustomerStore, InMemoryCrmStore, LedgerStore, StoreError,
};
pub use tasks::{
    ChannelError, DispatchOutcome, DispatcherConfig, InMemoryTaskStore, InsertOutcome,
    MessagingChannel, ReminderScheduler, ScanOutcome, TaskAdmin, TaskDispatcher,
    TaskFilter, TaskStats, TaskStore, TaskStoreError,
};
