//! One in-flight refinement per branch lineage.

use std::sync::Arc;

use dashmap::DashSet;

use branchwright_domain::BranchId;

use super::RefinementError;

#[derive(Debug, Default, Clone)]
pub struct RefinementRegistry {
    in_flight: Arc<DashSet<BranchId>>,
}

impl RefinementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lineage. The claim is released when the guard drops.
    pub fn acquire(&self, branch_id: BranchId) -> Result<LineageGuard, RefinementError> {
        if !self.in_flight.insert(branch_id) {
            return Err(RefinementError::AlreadyInFlight(branch_id));
        }
        Ok(LineageGuard {
            branch_id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, branch_id: BranchId) -> bool {
        self.in_flight.contains(&branch_id)
    }
}

#[derive(Debug)]
pub struct LineageGuard {
    branch_id: BranchId,
    in_flight: Arc<DashSet<BranchId>>,
}

impl Drop for LineageGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.branch_id);
    }
}
