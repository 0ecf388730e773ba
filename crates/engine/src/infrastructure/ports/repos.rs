//! Repository port traits for branch persistence.

use async_trait::async_trait;
use branchwright_domain::{AnchorId, BranchId, BranchRecord, BranchRecordPatch, BranchVariation};

use super::error::RepoError;

// =============================================================================
// Branch Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchRepo: Send + Sync {
    /// Store a new draft record for a variation.
    async fn create(&self, variation: BranchVariation) -> Result<BranchRecord, RepoError>;

    async fn get(&self, id: BranchId) -> Result<Option<BranchRecord>, RepoError>;

    /// Apply a partial update. Replacing the variation bumps the version.
    async fn update(&self, id: BranchId, patch: BranchRecordPatch)
        -> Result<BranchRecord, RepoError>;

    async fn list_for_anchor(&self, anchor_id: AnchorId) -> Result<Vec<BranchRecord>, RepoError>;

    /// Mark a branch selected, demoting any other selected branch of the
    /// same anchor to review. Returns the newly selected record.
    async fn select(&self, id: BranchId) -> Result<BranchRecord, RepoError>;
}
