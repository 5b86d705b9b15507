//! Billing cadence model: the step size, in whole calendar months, between
//! two consecutive payment obligations of a contract.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Billing frequency of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl BillingCadence {
    /// Step size in whole calendar months.
    pub fn months(self) -> u32 {
        match self {
            BillingCadence::Monthly => 1,
            BillingCadence::Quarterly => 3,
            BillingCadence::Semiannual => 6,
            BillingCadence::Annual => 12,
        }
    }

    /// Decode the legacy numeric payment-period column.
    ///
    /// Unknown codes degrade to monthly. This is a deliberate policy: the
    /// dashboard must stay total over whatever contract data exists.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => BillingCadence::Quarterly,
            3 => BillingCadence::Semiannual,
            4 => BillingCadence::Annual,
            _ => BillingCadence::Monthly,
        }
    }

    /// The next due date after `date` under this cadence.
    pub fn step_forward(self, date: NaiveDate) -> NaiveDate {
        step_date(date, self.months(), StepDirection::Forward)
    }

    /// The previous due date before `date` under this cadence.
    pub fn step_back(self, date: NaiveDate) -> NaiveDate {
        step_date(date, self.months(), StepDirection::Backward)
    }
}

impl Default for BillingCadence {
    fn default() -> Self {
        Self::Monthly
    }
}

/// Direction of a cadence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

/// Add or subtract whole calendar months, clamping to the last valid day of
/// the destination month (Jan 31 + 1 month = Feb 28/29, never Mar 2/3).
///
/// Total over its domain: chrono only fails at the representable-date
/// horizon, where the input date is returned unchanged.
pub fn step_date(date: NaiveDate, months: u32, direction: StepDirection) -> NaiveDate {
    let stepped = match direction {
        StepDirection::Forward => date.checked_add_months(Months::new(months)),
        StepDirection::Backward => date.checked_sub_months(Months::new(months)),
    };
    stepped.unwrap_or(date)
}
