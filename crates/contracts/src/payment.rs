use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roost_core::ContractId;

/// One recorded payment against a contract.
///
/// Produced by the billing subsystem when a payment is registered and never
/// mutated afterward (append-only ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub contract_id: ContractId,
    pub paid_on: NaiveDate,
    /// Amount in the smallest currency unit.
    pub amount: u64,
}

impl PaymentRecord {
    pub fn new(contract_id: ContractId, paid_on: NaiveDate, amount: u64) -> Self {
        Self {
            contract_id,
            paid_on,
            amount,
        }
    }
}
