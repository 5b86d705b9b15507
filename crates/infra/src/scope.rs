//! Branch scoping for queries and cache keys.

use serde::{Deserialize, Serialize};

use roost_core::BranchId;

/// Scope of a dashboard/store query.
///
/// - `AllBranches`: the privileged (top-account) view across every branch.
/// - `Branch`: a single branch manager's view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchScope {
    AllBranches,
    Branch(BranchId),
}

impl BranchScope {
    pub fn allows(&self, branch_id: BranchId) -> bool {
        match self {
            BranchScope::AllBranches => true,
            BranchScope::Branch(b) => *b == branch_id,
        }
    }

    /// Stable string form, used for cache-key logging.
    pub fn cache_key(&self) -> String {
        match self {
            BranchScope::AllBranches => "dashboard:all".to_string(),
            BranchScope::Branch(b) => format!("dashboard:{b}"),
        }
    }
}

impl core::fmt::Display for BranchScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_branches_allows_everything() {
        let scope = BranchScope::AllBranches;
        assert!(scope.allows(BranchId::new()));
        assert_eq!(scope.cache_key(), "dashboard:all");
    }

    #[test]
    fn single_branch_allows_only_itself() {
        let mine = BranchId::new();
        let scope = BranchScope::Branch(mine);
        assert!(scope.allows(mine));
        assert!(!scope.allows(BranchId::new()));
        assert!(scope.cache_key().starts_with("dashboard:"));
    }
}
