//! Dashboard summary read model.

use serde::{Deserialize, Serialize};

use roost_contracts::YearMonth;

/// One month's figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: YearMonth,
    /// Sum of `period_amount` over contracts owing in this month.
    pub receivable: u64,
    /// Sum of ledger payments landing in this month.
    pub received: u64,
    /// Sum of `period_amount` over contracts whose next due date is on or
    /// before this month's end. A coarse "potentially outstanding as of
    /// month-end" figure, not a true arrears calculation.
    pub unpaid: u64,
}

/// Trailing-12-month + current-year financial summary.
///
/// `months` is oldest first and ends at the as-of month. The `*_unpaid`
/// scalars are `receivable - received`, deliberately unclamped: a month
/// where collections outran obligations goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub months: Vec<MonthRow>,
    pub this_month_receivable: u64,
    pub this_month_received: u64,
    pub this_month_unpaid: i64,
    pub this_year_receivable: u64,
    pub this_year_received: u64,
    pub this_year_unpaid: i64,
}

impl MonthlySummary {
    /// Chart labels ("Jul", "Aug", ...), oldest first.
    pub fn month_labels(&self) -> Vec<String> {
        self.months.iter().map(|row| row.month.label()).collect()
    }
}
