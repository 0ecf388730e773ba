//! Classify trait and world-rule violations into a fix workflow.
//!
//! | Violation             | Fix type       | Severity        | Patch          |
//! |-----------------------|----------------|-----------------|----------------|
//! | core trait            | manual         | critical        | none           |
//! | secondary trait       | semi-automatic | error           | suggested      |
//! | minor trait           | automatic      | warning         | canned         |
//! | hard rule             | manual         | from the rule   | none           |
//! | soft rule, bent       | automatic      | warning         | canned         |
//! | soft rule, broken     | semi-automatic | error           | suggested      |
//!
//! Overridden hard violations were accepted upstream and produce no issue.

use std::sync::Arc;

use branchwright_domain::{
    BranchId, DomainError, FixIssue, FixPatch, FixType, FixWorkflow, IssueId, IssueSource,
    IssueStatus, PatchTarget, RuleViolation, Severity, SoftRuleOutcome, TieredValidationResult,
    TraitTier, TraitViolation, WorldRulesValidation,
};

use crate::infrastructure::ports::RandomPort;

#[derive(Debug, thiserror::Error)]
pub enum FixWorkflowError {
    #[error("Workflow belongs to branch {expected}, not {actual}")]
    BranchMismatch { expected: BranchId, actual: BranchId },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Issue ids come from the random port so seeded runs stay reproducible.
#[derive(Clone)]
pub struct FixClassifier {
    random: Arc<dyn RandomPort>,
}

impl FixClassifier {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    fn next_id(&self) -> IssueId {
        IssueId::from_uuid(self.random.gen_uuid())
    }

    /// Build the workflow for one branch from its trait and world reports.
    pub fn build_workflow(
        &self,
        branch_id: BranchId,
        trait_results: &[TieredValidationResult],
        world: &WorldRulesValidation,
    ) -> FixWorkflow {
        let trait_issues = trait_results
            .iter()
            .flat_map(|result| result.violations.iter())
            .map(|v| classify_trait(v, self.next_id()));
        let hard_issues = world
            .hard_violations
            .iter()
            .filter(|v| !v.overridden)
            .map(|v| classify_hard_rule(v, self.next_id()));
        let soft_issues = world
            .soft_violations
            .iter()
            .map(|v| classify_soft_rule(v, self.next_id()));

        let issues: Vec<FixIssue> = trait_issues.chain(hard_issues).chain(soft_issues).collect();
        let workflow = FixWorkflow::new(branch_id, issues);
        let status = workflow.status();
        tracing::debug!(
            branch_id = %branch_id,
            total = status.total,
            automatic = status.pending_automatic,
            semi_automatic = status.pending_semi_automatic,
            manual = status.pending_manual,
            blocked = status.blocked_by.len(),
            "Built fix workflow"
        );
        workflow
    }
}

fn classify_trait(violation: &TraitViolation, id: IssueId) -> FixIssue {
    let target = PatchTarget::ArcDescription {
        character_id: violation.character_id,
    };
    let trait_name = violation.kind.as_str().replace('-', " ");
    let (fix_type, severity, suggested_patch) = match violation.tier {
        TraitTier::Core => (FixType::Manual, Severity::Critical, None),
        TraitTier::Secondary => (
            FixType::SemiAutomatic,
            Severity::Error,
            Some(FixPatch {
                target,
                text: format!(
                    "{}'s {} shift only under the weight of what has happened.",
                    violation.character_name, trait_name
                ),
            }),
        ),
        TraitTier::Minor => (
            FixType::Automatic,
            Severity::Warning,
            Some(FixPatch {
                target,
                text: format!(
                    "Old {} still show through in {}'s quieter moments.",
                    trait_name, violation.character_name
                ),
            }),
        ),
    };
    FixIssue {
        id,
        source: IssueSource::Trait {
            character_id: violation.character_id,
            kind: violation.kind,
        },
        severity,
        fix_type,
        description: violation.reason.clone(),
        suggested_patch,
        target,
        status: IssueStatus::Pending,
    }
}

fn classify_hard_rule(violation: &RuleViolation, id: IssueId) -> FixIssue {
    FixIssue {
        id,
        source: IssueSource::WorldRule {
            rule_id: violation.rule_id,
            kind: violation.kind,
        },
        severity: violation.severity,
        fix_type: FixType::Manual,
        description: format!("{} (\"{}\")", violation.description, violation.evidence),
        suggested_patch: None,
        target: PatchTarget::TrajectoryResolution,
        status: IssueStatus::Pending,
    }
}

fn classify_soft_rule(violation: &RuleViolation, id: IssueId) -> FixIssue {
    let target = PatchTarget::PremiseDescription;
    let (fix_type, text) = match violation.soft_outcome {
        Some(SoftRuleOutcome::Bent) => (
            FixType::Automatic,
            "Extraordinary times explain why the old order gives way here.".to_string(),
        ),
        _ => (
            FixType::SemiAutomatic,
            format!(
                "Those who defy the old order pay a visible price for \"{}\".",
                violation.evidence
            ),
        ),
    };
    FixIssue {
        id,
        source: IssueSource::WorldRule {
            rule_id: violation.rule_id,
            kind: violation.kind,
        },
        severity: violation.severity,
        fix_type,
        description: violation.description.clone(),
        suggested_patch: Some(FixPatch { target, text }),
        target,
        status: IssueStatus::Pending,
    }
}
