//! In-memory CRM store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use roost_contracts::{Contract, PaymentRecord};
use roost_core::{ContractId, CustomerId};
use roost_customers::Customer;

use crate::scope::BranchScope;

use super::{ContractStore, CustomerStore, LedgerStore, StoreError};

/// In-memory stand-in for the CRUD application's database: contracts,
/// customers, and the payment ledger behind one handle.
#[derive(Debug, Default)]
pub struct InMemoryCrmStore {
    contracts: RwLock<HashMap<ContractId, Contract>>,
    customers: RwLock<HashMap<CustomerId, Customer>>,
    payments: RwLock<Vec<PaymentRecord>>,
}

impl InMemoryCrmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn insert_customer(&self, customer: Customer) {
        let mut customers = self.customers.write().unwrap();
        customers.insert(customer.id_typed(), customer);
    }

    pub fn insert_contract(&self, contract: Contract) {
        let mut contracts = self.contracts.write().unwrap();
        contracts.insert(contract.id_typed(), contract);
    }

    pub fn record_payment(&self, payment: PaymentRecord) {
        let mut payments = self.payments.write().unwrap();
        payments.push(payment);
    }
}

impl ContractStore for InMemoryCrmStore {
    fn contracts_in_scope(&self, scope: BranchScope) -> Result<Vec<Contract>, StoreError> {
        let contracts = self.contracts.read().unwrap();
        let mut result: Vec<_> = contracts
            .values()
            .filter(|c| scope.allows(c.branch_id()))
            .cloned()
            .collect();
        result.sort_by_key(|c| c.id_typed().as_uuid().as_bytes().to_owned());
        Ok(result)
    }

    fn active_contracts_with_customers(
        &self,
    ) -> Result<Vec<(Contract, Customer)>, StoreError> {
        let contracts = self.contracts.read().unwrap();
        let customers = self.customers.read().unwrap();

        let mut result: Vec<_> = contracts
            .values()
            .filter(|c| c.is_active())
            .filter_map(|c| {
                customers
                    .get(&c.customer_id())
                    .map(|cust| (c.clone(), cust.clone()))
            })
            .collect();
        result.sort_by_key(|(c, _)| c.id_typed().as_uuid().as_bytes().to_owned());
        Ok(result)
    }
}

impl CustomerStore for InMemoryCrmStore {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let customers = self.customers.read().unwrap();
        Ok(customers.get(&id).cloned())
    }
}

impl LedgerStore for InMemoryCrmStore {
    fn payments_in_range(
        &self,
        contract_ids: &[ContractId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        let payments = self.payments.read().unwrap();
        Ok(payments
            .iter()
            .filter(|p| {
                contract_ids.contains(&p.contract_id) && p.paid_on >= from && p.paid_on <= to
            })
            .cloned()
            .collect())
    }
}
