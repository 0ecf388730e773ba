//! Branch lifecycle use cases: persistence, fix actions and selection.

use std::sync::Arc;

use branchwright_domain::{
    AnchorId, BlockingIssue, BlockingSource, BranchId, BranchRecord, BranchRecordPatch,
    BranchStatus, BranchVariation, FixWorkflow, IssueId,
};

use super::pipeline::BranchReview;
use super::world_rules::FixWorkflowError;
use crate::infrastructure::ports::{BranchRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum BranchError {
    #[error("Branch not found: {0}")]
    NotFound(BranchId),
    #[error("Branch {branch_id} has {count} blocking issue(s) that must be acknowledged")]
    BlockingIssuesUnacknowledged { branch_id: BranchId, count: usize },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Fix error: {0}")]
    Fix(#[from] FixWorkflowError),
}

/// Container for branch lifecycle operations.
pub struct BranchUseCases {
    repo: Arc<dyn BranchRepo>,
}

impl BranchUseCases {
    pub fn new(repo: Arc<dyn BranchRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, variation: BranchVariation) -> Result<BranchRecord, BranchError> {
        let record = self.repo.create(variation).await?;
        tracing::debug!(branch_id = %record.id(), anchor_id = %record.anchor_id(), "Stored branch");
        Ok(record)
    }

    pub async fn get(&self, id: BranchId) -> Result<BranchRecord, BranchError> {
        self.repo.get(id).await?.ok_or(BranchError::NotFound(id))
    }

    pub async fn list(&self, anchor_id: AnchorId) -> Result<Vec<BranchRecord>, BranchError> {
        Ok(self.repo.list_for_anchor(anchor_id).await?)
    }

    /// Store a refined variation for an existing branch.
    pub async fn update_variation(
        &self,
        variation: BranchVariation,
    ) -> Result<BranchRecord, BranchError> {
        let id = variation.id;
        let patch = BranchRecordPatch {
            variation: Some(variation),
            ..Default::default()
        };
        Ok(self.repo.update(id, patch).await?)
    }

    /// Attach review findings to the record. Drafts move to review.
    pub async fn record_review(&self, review: &BranchReview) -> Result<BranchRecord, BranchError> {
        let record = self.get(review.branch_id).await?;
        let status = (record.status() == BranchStatus::Draft).then_some(BranchStatus::Review);
        let patch = BranchRecordPatch {
            blocking_issues: Some(review.blocking_issues.clone()),
            status,
            ..Default::default()
        };
        Ok(self.repo.update(record.id(), patch).await?)
    }

    /// Select a branch for its anchor.
    ///
    /// A branch with blocking issues is only selected once the caller has
    /// acknowledged them.
    pub async fn select_branch(
        &self,
        id: BranchId,
        acknowledged: bool,
    ) -> Result<BranchRecord, BranchError> {
        let record = self.get(id).await?;
        let count = record.blocking_issues().len();
        if count > 0 && !acknowledged {
            tracing::warn!(branch_id = %id, blocking = count, "Refused selection with unacknowledged blocking issues");
            return Err(BranchError::BlockingIssuesUnacknowledged {
                branch_id: id,
                count,
            });
        }

        let selected = self.repo.select(id).await?;
        tracing::info!(
            branch_id = %id,
            anchor_id = %selected.anchor_id(),
            acknowledged_issues = count,
            "Selected branch"
        );
        Ok(selected)
    }

    // =========================================================================
    // Fix actions
    // =========================================================================
    //
    // Each action runs on a copy of the workflow; the caller's workflow only
    // advances once the record has been persisted.

    /// Apply every pending automatic fix and persist the patched variation.
    pub async fn apply_automatic_fixes(
        &self,
        id: BranchId,
        workflow: &mut FixWorkflow,
    ) -> Result<(BranchRecord, Vec<IssueId>), BranchError> {
        let record = self.fix_target(id, workflow).await?;
        let mut next = workflow.clone();
        let (patched, applied) = next.apply_automatic_fixes(record.variation());
        let variation = (!applied.is_empty()).then_some(patched);
        let saved = self.persist_fix(&record, &next, variation).await?;
        tracing::info!(branch_id = %record.id(), applied = applied.len(), "Applied automatic fixes");
        *workflow = next;
        Ok((saved, applied))
    }

    pub async fn accept_fix(
        &self,
        id: BranchId,
        workflow: &mut FixWorkflow,
        issue_id: IssueId,
    ) -> Result<BranchRecord, BranchError> {
        let record = self.fix_target(id, workflow).await?;
        let mut next = workflow.clone();
        let patched = next
            .accept(issue_id, record.variation())
            .map_err(FixWorkflowError::from)?;
        let saved = self.persist_fix(&record, &next, Some(patched)).await?;
        *workflow = next;
        Ok(saved)
    }

    pub async fn edit_fix(
        &self,
        id: BranchId,
        workflow: &mut FixWorkflow,
        issue_id: IssueId,
        text: impl Into<String>,
    ) -> Result<BranchRecord, BranchError> {
        let record = self.fix_target(id, workflow).await?;
        let mut next = workflow.clone();
        let patched = next
            .edit(issue_id, text, record.variation())
            .map_err(FixWorkflowError::from)?;
        let saved = self.persist_fix(&record, &next, Some(patched)).await?;
        *workflow = next;
        Ok(saved)
    }

    pub async fn dismiss_fix(
        &self,
        id: BranchId,
        workflow: &mut FixWorkflow,
        issue_id: IssueId,
    ) -> Result<BranchRecord, BranchError> {
        let record = self.fix_target(id, workflow).await?;
        let mut next = workflow.clone();
        next.dismiss(issue_id).map_err(FixWorkflowError::from)?;
        let saved = self.persist_fix(&record, &next, None).await?;
        *workflow = next;
        Ok(saved)
    }

    async fn fix_target(
        &self,
        id: BranchId,
        workflow: &FixWorkflow,
    ) -> Result<BranchRecord, BranchError> {
        if workflow.branch_id() != id {
            return Err(FixWorkflowError::BranchMismatch {
                expected: workflow.branch_id(),
                actual: id,
            }
            .into());
        }
        self.get(id).await
    }

    async fn persist_fix(
        &self,
        record: &BranchRecord,
        workflow: &FixWorkflow,
        variation: Option<BranchVariation>,
    ) -> Result<BranchRecord, BranchError> {
        let patch = BranchRecordPatch {
            variation,
            blocking_issues: Some(refresh_fix_issues(record.blocking_issues(), workflow)),
            ..Default::default()
        };
        Ok(self.repo.update(record.id(), patch).await?)
    }
}

/// Replace fix-sourced blocking issues with the workflow's unresolved
/// critical issues. Other sources are kept as they are.
fn refresh_fix_issues(current: &[BlockingIssue], workflow: &FixWorkflow) -> Vec<BlockingIssue> {
    let kept = current
        .iter()
        .filter(|issue| issue.source != BlockingSource::Fix)
        .cloned();
    let unresolved = workflow
        .status()
        .blocked_by
        .into_iter()
        .filter_map(|id| workflow.issue(id))
        .map(|issue| BlockingIssue {
            source: BlockingSource::Fix,
            description: issue.description.clone(),
        })
        .collect::<Vec<_>>();
    kept.chain(unresolved).collect()
}
