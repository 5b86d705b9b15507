use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roost_core::{BranchId, ContractId, CustomerId, DomainError, DomainResult, Entity};

use crate::cadence::BillingCadence;

/// Classification of a contract's usable date information, in priority
/// order: full start/end bounds beat a bare anchor due date.
///
/// This replaces nested null checks on the date columns with an exhaustive
/// match; each variant selects one projection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingTerms {
    /// Both term bounds are known; obligations are projected from `start`.
    Bounded { start: NaiveDate, end: NaiveDate },
    /// No usable term bounds, but a live due date exists; obligations are
    /// projected in both directions from the anchor.
    Anchored { next_due: NaiveDate },
    /// No usable date information at all.
    Unscheduled,
}

/// Contract read entity.
///
/// Owned (created/updated) by the CRUD subsystem; this core only reads it.
/// `next_due_date` may have drifted out of sync with `start_date` through
/// manual payment adjustments; the projector tolerates that rather than
/// rejecting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    branch_id: BranchId,
    customer_id: CustomerId,
    name: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    signing_date: Option<NaiveDate>,
    cadence: BillingCadence,
    /// Day of month (1-31) the payment is due.
    anchor_day_of_month: u8,
    next_due_date: Option<NaiveDate>,
    last_paid_date: Option<NaiveDate>,
    /// Amount due per billing period, in the smallest currency unit.
    period_amount: u64,
    active: bool,
}

impl Contract {
    pub fn new(
        id: ContractId,
        branch_id: BranchId,
        customer_id: CustomerId,
        name: impl Into<String>,
        cadence: BillingCadence,
        anchor_day_of_month: u8,
        period_amount: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("contract name cannot be empty"));
        }
        if !(1..=31).contains(&anchor_day_of_month) {
            return Err(DomainError::validation(format!(
                "anchor_day_of_month must be 1-31, got {anchor_day_of_month}"
            )));
        }
        Ok(Self {
            id,
            branch_id,
            customer_id,
            name,
            start_date: None,
            end_date: None,
            signing_date: None,
            cadence,
            anchor_day_of_month,
            next_due_date: None,
            last_paid_date: None,
            period_amount,
            active: true,
        })
    }

    /// Set both term bounds. Invariant: `end >= start`.
    pub fn with_term(mut self, start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "end_date {end} precedes start_date {start}"
            )));
        }
        self.start_date = Some(start);
        self.end_date = Some(end);
        Ok(self)
    }

    pub fn with_signing_date(mut self, date: NaiveDate) -> Self {
        self.signing_date = Some(date);
        self
    }

    pub fn with_next_due_date(mut self, date: NaiveDate) -> Self {
        self.next_due_date = Some(date);
        self
    }

    pub fn with_last_paid_date(mut self, date: NaiveDate) -> Self {
        self.last_paid_date = Some(date);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn id_typed(&self) -> ContractId {
        self.id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn signing_date(&self) -> Option<NaiveDate> {
        self.signing_date
    }

    pub fn cadence(&self) -> BillingCadence {
        self.cadence
    }

    pub fn anchor_day_of_month(&self) -> u8 {
        self.anchor_day_of_month
    }

    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.next_due_date
    }

    pub fn last_paid_date(&self) -> Option<NaiveDate> {
        self.last_paid_date
    }

    pub fn period_amount(&self) -> u64 {
        self.period_amount
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Classify the usable date information for projection.
    pub fn billing_terms(&self) -> BillingTerms {
        match (self.start_date, self.end_date, self.next_due_date) {
            (Some(start), Some(end), _) => BillingTerms::Bounded { start, end },
            (_, _, Some(next_due)) => BillingTerms::Anchored { next_due },
            _ => BillingTerms::Unscheduled,
        }
    }

    /// The due date that follows the current one, one cadence period later.
    ///
    /// Used by the payment-recording path to roll the contract forward after
    /// a payment lands. `None` when no due date is known.
    pub fn next_due_after_payment(&self) -> Option<NaiveDate> {
        self.next_due_date.map(|due| self.cadence.step_forward(due))
    }
}

impl Entity for Contract {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_contract(cadence: BillingCadence) -> Contract {
        Contract::new(
            ContractId::new(),
            BranchId::new(),
            CustomerId::new(),
            "Hot desk A-12",
            cadence,
            5,
            12_000,
        )
        .unwrap()
    }

    #[test]
    fn new_validates_name_and_anchor_day() {
        let err = Contract::new(
            ContractId::new(),
            BranchId::new(),
            CustomerId::new(),
            "",
            BillingCadence::Monthly,
            5,
            1000,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Contract::new(
            ContractId::new(),
            BranchId::new(),
            CustomerId::new(),
            "Desk",
            BillingCadence::Monthly,
            0,
            1000,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn with_term_rejects_inverted_bounds() {
        let err = test_contract(BillingCadence::Monthly)
            .with_term(date(2024, 6, 1), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn billing_terms_prefers_bounds_over_anchor() {
        let contract = test_contract(BillingCadence::Monthly)
            .with_term(date(2024, 1, 1), date(2024, 12, 31))
            .unwrap()
            .with_next_due_date(date(2024, 7, 5));

        assert_eq!(
            contract.billing_terms(),
            BillingTerms::Bounded {
                start: date(2024, 1, 1),
                end: date(2024, 12, 31),
            }
        );
    }

    #[test]
    fn billing_terms_falls_back_to_anchor_then_unscheduled() {
        let anchored =
            test_contract(BillingCadence::Monthly).with_next_due_date(date(2024, 7, 5));
        assert_eq!(
            anchored.billing_terms(),
            BillingTerms::Anchored {
                next_due: date(2024, 7, 5),
            }
        );

        let unscheduled = test_contract(BillingCadence::Monthly);
        assert_eq!(unscheduled.billing_terms(), BillingTerms::Unscheduled);
    }

    #[test]
    fn builders_populate_the_read_fields() {
        let contract = test_contract(BillingCadence::Monthly)
            .with_term(date(2024, 1, 1), date(2024, 12, 31))
            .unwrap()
            .with_signing_date(date(2023, 12, 20))
            .with_next_due_date(date(2024, 7, 5))
            .with_last_paid_date(date(2024, 6, 5))
            .with_active(false);

        assert_eq!(contract.name(), "Hot desk A-12");
        assert_eq!(contract.signing_date(), Some(date(2023, 12, 20)));
        assert_eq!(contract.last_paid_date(), Some(date(2024, 6, 5)));
        assert_eq!(contract.anchor_day_of_month(), 5);
        assert_eq!(contract.period_amount(), 12_000);
        assert!(!contract.is_active());
    }

    #[test]
    fn next_due_after_payment_steps_by_cadence() {
        let contract = test_contract(BillingCadence::Quarterly)
            .with_next_due_date(date(2024, 11, 30));
        assert_eq!(contract.next_due_after_payment(), Some(date(2025, 2, 28)));

        let no_due = test_contract(BillingCadence::Quarterly);
        assert_eq!(no_due.next_due_after_payment(), None);
    }
}
