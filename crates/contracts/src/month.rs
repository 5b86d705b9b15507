//! Calendar-month arithmetic for obligation windows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use roost_core::{DomainError, DomainResult};

/// A calendar month: the unit every obligation window is expressed in.
///
/// Ordered chronologically; `month` is always 1–12.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "month must be 1-12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.plus_months(1)
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn plus_months(&self, months: u32) -> Self {
        Self::from_index(self.index() + months as i64)
    }

    pub fn minus_months(&self, months: u32) -> Self {
        Self::from_index(self.index() - months as i64)
    }

    /// January of this month's year.
    pub fn start_of_year(&self) -> Self {
        Self {
            year: self.year,
            month: 1,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Short English month label ("Jan", "Feb", ...), as charted.
    pub fn label(&self) -> String {
        self.first_day().format("%b").to_string()
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl core::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
