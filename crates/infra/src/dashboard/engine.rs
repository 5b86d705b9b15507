//! Dashboard aggregation engine.
//!
//! Combines per-month projector decisions over the contract book with the
//! payment ledger into a `MonthlySummary`, cached per branch scope with a
//! fixed TTL.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};

use roost_contracts::{has_obligation_in_month, Contract, YearMonth};
use roost_core::{ContractId, DomainResult};

use crate::scope::BranchScope;
use crate::stores::{ContractStore, LedgerStore};

use super::cache::SummaryCache;
use super::summary::{MonthRow, MonthlySummary};

/// Fixed cache TTL (30 minutes).
pub const SUMMARY_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// How many trailing months the summary charts.
pub const TRAILING_MONTHS: usize = 12;

/// Cached aggregation over contracts and payments.
///
/// The recompute path is a critical section: concurrent dashboard requests
/// for a cold scope wait for one computation instead of stampeding the
/// stores. Entries are last-writer-wins since a scope's summary is
/// deterministic given the same inputs.
pub struct DashboardEngine<C, L, K>
where
    C: ContractStore,
    L: LedgerStore,
    K: SummaryCache,
{
    contracts: C,
    ledger: L,
    cache: K,
    ttl: Duration,
    recompute: Mutex<()>,
}

impl<C, L, K> DashboardEngine<C, L, K>
where
    C: ContractStore,
    L: LedgerStore,
    K: SummaryCache,
{
    pub fn new(contracts: C, ledger: L, cache: K) -> Self {
        Self {
            contracts,
            ledger,
            cache,
            ttl: SUMMARY_CACHE_TTL,
            recompute: Mutex::new(()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The summary for `scope` as of `today`, served from cache when fresh.
    ///
    /// Fails atomically on store errors: nothing is cached and no partial
    /// summary is returned.
    pub fn summary(&self, scope: BranchScope, today: NaiveDate) -> DomainResult<MonthlySummary> {
        if let Some(hit) = self.cache.get(scope) {
            return Ok(hit);
        }

        let _guard = self
            .recompute
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Another request may have filled the entry while we waited.
        if let Some(hit) = self.cache.get(scope) {
            return Ok(hit);
        }

        let summary = self.compute(scope, today)?;
        self.cache.put(scope, summary.clone(), self.ttl);
        tracing::debug!(scope = %scope, "dashboard summary recomputed");
        Ok(summary)
    }

    /// Forced refresh: drop every scope's cache entry, then recompute and
    /// re-cache the caller's own scope synchronously.
    pub fn refresh(&self, scope: BranchScope, today: NaiveDate) -> DomainResult<MonthlySummary> {
        let _guard = self
            .recompute
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.cache.invalidate_all();

        let summary = self.compute(scope, today)?;
        self.cache.put(scope, summary.clone(), self.ttl);
        tracing::info!(scope = %scope, "dashboard cache refreshed");
        Ok(summary)
    }

    fn compute(&self, scope: BranchScope, today: NaiveDate) -> DomainResult<MonthlySummary> {
        let contracts = self.contracts.contracts_in_scope(scope)?;

        let current = YearMonth::of(today);
        let months: Vec<YearMonth> = (0..TRAILING_MONTHS as u32)
            .rev()
            .map(|i| current.minus_months(i))
            .collect();

        // One ledger fetch covers both the chart and the year-to-date
        // figures: January of the current year is at most 11 months back.
        let contract_ids: Vec<ContractId> =
            contracts.iter().map(|c| c.id_typed()).collect();
        let payments = self.ledger.payments_in_range(
            &contract_ids,
            months[0].first_day(),
            current.last_day(),
        )?;

        let mut received_by_month: HashMap<YearMonth, u64> = HashMap::new();
        for payment in &payments {
            *received_by_month
                .entry(YearMonth::of(payment.paid_on))
                .or_default() += payment.amount;
        }

        let rows: Vec<MonthRow> = months
            .iter()
            .map(|&month| MonthRow {
                month,
                receivable: receivable_for_month(&contracts, month),
                received: received_by_month.get(&month).copied().unwrap_or(0),
                unpaid: outstanding_as_of_month_end(&contracts, month),
            })
            .collect();

        let this_row = &rows[TRAILING_MONTHS - 1];
        let this_month_receivable = this_row.receivable;
        let this_month_received = this_row.received;

        let january = current.start_of_year();
        let this_year_receivable: u64 = (0..12u32)
            .map(|i| receivable_for_month(&contracts, january.plus_months(i)))
            .sum();
        let this_year_received: u64 = payments
            .iter()
            .filter(|p| p.paid_on.year() == today.year())
            .map(|p| p.amount)
            .sum();

        Ok(MonthlySummary {
            months: rows,
            this_month_receivable,
            this_month_received,
            this_month_unpaid: this_month_receivable as i64 - this_month_received as i64,
            this_year_receivable,
            this_year_received,
            this_year_unpaid: this_year_receivable as i64 - this_year_received as i64,
        })
    }
}

fn receivable_for_month(contracts: &[Contract], month: YearMonth) -> u64 {
    contracts
        .iter()
        .filter(|c| has_obligation_in_month(c, month))
        .map(|c| c.period_amount())
        .sum()
}

fn outstanding_as_of_month_end(contracts: &[Contract], month: YearMonth) -> u64 {
    let month_end = month.last_day();
    contracts
        .iter()
        .filter(|c| c.next_due_date().is_some_and(|due| due <= month_end))
        .map(|c| c.period_amount())
        .sum()
}
