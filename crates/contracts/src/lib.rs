//! Contract domain module.
//!
//! This crate contains the billing-side business rules for co-working
//! contracts, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage): the billing cadence model, calendar-month arithmetic,
//! the contract entity with its billing-terms classification, payment
//! records, and the obligation window projector.

pub mod cadence;
pub mod contract;
pub mod month;
pub mod payment;
pub mod projector;

pub use cadence::{step_date, BillingCadence, StepDirection};
pub use contract::{BillingTerms, Contract};
pub use month::YearMonth;
pub use payment::PaymentRecord;
pub use projector::{has_obligation_in_month, has_obligation_in_window};
