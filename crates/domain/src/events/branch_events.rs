//! BranchRecord mutation outcomes.

use crate::aggregates::BranchStatus;

/// Outcome of updating a branch record.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchRecordUpdate {
    StatusChanged {
        from: BranchStatus,
        to: BranchStatus,
    },
    VariationReplaced {
        version: u32,
    },
    BlockingIssuesChanged {
        from: usize,
        to: usize,
    },
    Unchanged,
}
