//! Obligation window projector: decides whether a contract has a payment
//! obligation inside a given calendar month.

use chrono::NaiveDate;

use crate::cadence::{step_date, StepDirection};
use crate::contract::{BillingTerms, Contract};
use crate::month::YearMonth;

/// How far past the window the anchored search may run, in months, in each
/// direction. Keeps the search bounded when cadence and window are
/// misaligned; no cadence (max step 12 months) has an obligation month more
/// than a year from the window while skipping every nearer one.
const SEARCH_BOUND_MONTHS: u32 = 12;

/// Whether `contract` has a billing event in the calendar month of
/// `window_start`.
///
/// Total over its input: malformed or missing date information degrades to
/// "no obligation" rather than erroring.
pub fn has_obligation_in_window(
    contract: &Contract,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> bool {
    let target = YearMonth::of(window_start);
    let step_months = contract.cadence().months();

    match contract.billing_terms() {
        BillingTerms::Bounded { start, end } => {
            // Contract term must intersect the window at all.
            if start > window_end || end < window_start {
                return false;
            }

            let mut due = start;
            while due <= end {
                if YearMonth::of(due) == target {
                    return true;
                }
                let next = step_date(due, step_months, StepDirection::Forward);
                if next <= due {
                    break; // calendar horizon
                }
                due = next;
            }
            false
        }
        BillingTerms::Anchored { next_due } => {
            // The live due date may have drifted from the original start
            // date, so anchor on it and search both directions.
            if YearMonth::of(next_due) == target {
                return true;
            }

            let forward_bound =
                step_date(window_end, SEARCH_BOUND_MONTHS, StepDirection::Forward);
            let mut due = step_date(next_due, step_months, StepDirection::Forward);
            while due <= forward_bound {
                if YearMonth::of(due) == target {
                    return true;
                }
                let next = step_date(due, step_months, StepDirection::Forward);
                if next <= due {
                    break;
                }
                due = next;
            }

            let backward_bound =
                step_date(window_start, SEARCH_BOUND_MONTHS, StepDirection::Backward);
            let mut due = step_date(next_due, step_months, StepDirection::Backward);
            while due >= backward_bound {
                if YearMonth::of(due) == target {
                    return true;
                }
                let prev = step_date(due, step_months, StepDirection::Backward);
                if prev >= due {
                    break;
                }
                due = prev;
            }

            false
        }
        BillingTerms::Unscheduled => false,
    }
}

/// Convenience form over a whole calendar month.
pub fn has_obligation_in_month(contract: &Contract, month: YearMonth) -> bool {
    has_obligation_in_window(contract, month.first_day(), month.last_day())
}
