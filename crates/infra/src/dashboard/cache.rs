//! Summary cache abstraction.
//!
//! An explicit, injected cache keyed by the strongly-typed branch scope —
//! lifecycle owned by the caller, not a process-wide singleton.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scope::BranchScope;

use super::summary::MonthlySummary;

/// Cache for computed summaries, with per-entry TTL.
pub trait SummaryCache: Send + Sync {
    /// A non-expired entry for `scope`, if any.
    fn get(&self, scope: BranchScope) -> Option<MonthlySummary>;

    /// Store `summary` for `scope`, replacing any previous entry
    /// (last-writer-wins: all computations for a scope are deterministic
    /// given the same inputs).
    fn put(&self, scope: BranchScope, summary: MonthlySummary, ttl: Duration);

    fn invalidate(&self, scope: BranchScope);

    /// Drop every scope's entry (forced refresh).
    fn invalidate_all(&self);
}

impl<C> SummaryCache for Arc<C>
where
    C: SummaryCache + ?Sized,
{
    fn get(&self, scope: BranchScope) -> Option<MonthlySummary> {
        (**self).get(scope)
    }

    fn put(&self, scope: BranchScope, summary: MonthlySummary, ttl: Duration) {
        (**self).put(scope, summary, ttl)
    }

    fn invalidate(&self, scope: BranchScope) {
        (**self).invalidate(scope)
    }

    fn invalidate_all(&self) {
        (**self).invalidate_all()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    summary: MonthlySummary,
    cached_at: DateTime<Utc>,
    ttl: chrono::Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.cached_at) <= self.ttl
    }
}

/// In-memory summary cache for tests/dev and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemorySummaryCache {
    entries: RwLock<HashMap<BranchScope, CacheEntry>>,
}

impl InMemorySummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SummaryCache for InMemorySummaryCache {
    fn get(&self, scope: BranchScope) -> Option<MonthlySummary> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(&scope)?;
        if !entry.is_fresh(Utc::now()) {
            return None;
        }
        Some(entry.summary.clone())
    }

    fn put(&self, scope: BranchScope, summary: MonthlySummary, ttl: Duration) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            scope,
            CacheEntry {
                summary,
                cached_at: Utc::now(),
                ttl: chrono::Duration::from_std(ttl).unwrap_or_default(),
            },
        );
    }

    fn invalidate(&self, scope: BranchScope) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(&scope);
    }

    fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::BranchId;

    fn test_summary(marker: u64) -> MonthlySummary {
        MonthlySummary {
            months: Vec::new(),
            this_month_receivable: marker,
            this_month_received: 0,
            this_month_unpaid: marker as i64,
            this_year_receivable: 0,
            this_year_received: 0,
            this_year_unpaid: 0,
        }
    }

    #[test]
    fn put_then_get_round_trips_per_scope() {
        let cache = InMemorySummaryCache::new();
        let branch = BranchScope::Branch(BranchId::new());
        let ttl = Duration::from_secs(60);

        cache.put(BranchScope::AllBranches, test_summary(1), ttl);
        cache.put(branch, test_summary(2), ttl);

        assert_eq!(
            cache.get(BranchScope::AllBranches).unwrap().this_month_receivable,
            1
        );
        assert_eq!(cache.get(branch).unwrap().this_month_receivable, 2);
    }

    #[test]
    fn zero_ttl_entries_are_already_stale() {
        let cache = InMemorySummaryCache::new();
        cache.put(BranchScope::AllBranches, test_summary(1), Duration::ZERO);
        // cached_at == now would still pass <=; anything observably later
        // will not. Spin until the clock ticks.
        let start = Utc::now();
        while Utc::now() == start {
            std::hint::spin_loop();
        }
        assert!(cache.get(BranchScope::AllBranches).is_none());
    }

    #[test]
    fn invalidate_drops_one_scope_only() {
        let cache = InMemorySummaryCache::new();
        let ttl = Duration::from_secs(60);
        let branch = BranchScope::Branch(BranchId::new());
        cache.put(BranchScope::AllBranches, test_summary(1), ttl);
        cache.put(branch, test_summary(2), ttl);

        cache.invalidate(BranchScope::AllBranches);
        assert!(cache.get(BranchScope::AllBranches).is_none());
        assert!(cache.get(branch).is_some());
    }

    #[test]
    fn invalidate_all_drops_every_scope() {
        let cache = InMemorySummaryCache::new();
        let ttl = Duration::from_secs(60);
        cache.put(BranchScope::AllBranches, test_summary(1), ttl);
        cache.put(BranchScope::Branch(BranchId::new()), test_summary(2), ttl);

        cache.invalidate_all();
        assert!(cache.get(BranchScope::AllBranches).is_none());
    }

    #[test]
    fn last_writer_wins() {
        let cache = InMemorySummaryCache::new();
        let ttl = Duration::from_secs(60);
        cache.put(BranchScope::AllBranches, test_summary(1), ttl);
        cache.put(BranchScope::AllBranches, test_summary(2), ttl);
        assert_eq!(
            cache.get(BranchScope::AllBranches).unwrap().this_month_receivable,
            2
        );
    }
}
