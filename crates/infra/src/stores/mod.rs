//! Collaborator store abstractions.
//!
//! The core is consumed as an in-process library; the surrounding CRUD
//! application supplies these stores. All calls are synchronous — any
//! timeout/retry policy for a real backend belongs to the caller.

pub mod memory;

pub use memory::InMemoryCrmStore;

use std::sync::Arc;

use chrono::NaiveDate;

use roost_contracts::{Contract, PaymentRecord};
use roost_core::{ContractId, CustomerId, DomainError};
use roost_customers::Customer;

use crate::scope::BranchScope;

/// Store access failure. Surfaced to callers as `DependencyUnavailable`;
/// no operation returns partial results over a failing store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::dependency(err.to_string())
    }
}

/// Read access to the contract book.
pub trait ContractStore: Send + Sync {
    /// All contracts visible in `scope` (dashboard input; includes inactive
    /// contracts, whose dates still drive the receivable columns).
    fn contracts_in_scope(&self, scope: BranchScope) -> Result<Vec<Contract>, StoreError>;

    /// Active contracts joined with their customers (reminder-scan input).
    fn active_contracts_with_customers(
        &self,
    ) -> Result<Vec<(Contract, Customer)>, StoreError>;
}

/// Read access to customer records.
pub trait CustomerStore: Send + Sync {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

/// Read access to the append-only payment ledger.
pub trait LedgerStore: Send + Sync {
    /// Payments for the given contracts with `from <= paid_on <= to`.
    fn payments_in_range(
        &self,
        contract_ids: &[ContractId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, StoreError>;
}

impl<S> ContractStore for Arc<S>
where
    S: ContractStore + ?Sized,
{
    fn contracts_in_scope(&self, scope: BranchScope) -> Result<Vec<Contract>, StoreError> {
        (**self).contracts_in_scope(scope)
    }

    fn active_contracts_with_customers(
        &self,
    ) -> Result<Vec<(Contract, Customer)>, StoreError> {
        (**self).active_contracts_with_customers()
    }
}

impl<S> CustomerStore for Arc<S>
where
    S: CustomerStore + ?Sized,
{
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        (**self).customer(id)
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn payments_in_range(
        &self,
        contract_ids: &[ContractId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        (**self).payments_in_range(contract_ids, from, to)
    }
}
