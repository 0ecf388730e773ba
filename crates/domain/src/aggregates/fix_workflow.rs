//! FixWorkflow aggregate - actionable fixes for trait and world-rule violations
//!
//! Issues are classified once, when the workflow is built, into three fix
//! types. Automatic issues carry a canned patch and are drained by
//! `apply_automatic_fixes`. Semi-automatic issues carry a suggested patch that
//! a human accepts or edits. Manual issues carry no patch at all.
//!
//! # Invariants
//!
//! - A critical issue can never be dismissed, only resolved by an accepted
//!   or edited fix
//! - `status().can_proceed` is false while any critical issue is unresolved

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{Severity, TraitKind};
use crate::value_objects::{BranchVariation, RuleKind};
use crate::{BranchId, CharacterId, IssueId, WorldRuleId};

/// How much human involvement a fix needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixType {
    Automatic,
    SemiAutomatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    Pending,
    /// Resolved by `apply_automatic_fixes`
    Applied,
    Accepted,
    Edited,
    Dismissed,
}

impl IssueStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, IssueStatus::Pending)
    }
}

/// What produced the issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IssueSource {
    Trait {
        character_id: CharacterId,
        kind: TraitKind,
    },
    WorldRule {
        rule_id: Option<WorldRuleId>,
        kind: RuleKind,
    },
}

/// Field of a variation a patch writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "kebab-case")]
pub enum PatchTarget {
    PremiseDescription,
    TrajectoryResolution,
    ArcDescription { character_id: CharacterId },
}

/// A textual patch: a sentence appended to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPatch {
    pub target: PatchTarget,
    pub text: String,
}

impl FixPatch {
    /// New variation with the patch text appended to the target field.
    ///
    /// An arc target naming a character without an arc leaves the variation
    /// unchanged.
    pub fn apply(&self, variation: &BranchVariation) -> BranchVariation {
        match self.target {
            PatchTarget::PremiseDescription => {
                let mut premise = variation.premise.clone();
                premise.description = append_sentence(&premise.description, &self.text);
                variation.with_premise(premise)
            }
            PatchTarget::TrajectoryResolution => {
                let mut trajectory = variation.trajectory.clone();
                trajectory.resolution = append_sentence(&trajectory.resolution, &self.text);
                variation.with_trajectory(trajectory)
            }
            PatchTarget::ArcDescription { character_id } => {
                let arcs = variation
                    .character_arcs
                    .iter()
                    .map(|arc| {
                        if arc.character_id == character_id {
                            let mut arc = arc.clone();
                            arc.arc_description = append_sentence(&arc.arc_description, &self.text);
                            arc
                        } else {
                            arc.clone()
                        }
                    })
                    .collect();
                variation.with_character_arcs(arcs)
            }
        }
    }
}

fn append_sentence(existing: &str, addition: &str) -> String {
    let existing = existing.trim();
    let addition = addition.trim();
    if existing.is_empty() {
        return addition.to_string();
    }
    if existing.ends_with(['.', '!', '?']) {
        format!("{} {}", existing, addition)
    } else {
        format!("{}. {}", existing, addition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixIssue {
    pub id: IssueId,
    pub source: IssueSource,
    pub severity: Severity,
    pub fix_type: FixType,
    pub description: String,
    /// `None` for manual fixes
    pub suggested_patch: Option<FixPatch>,
    /// Where a manual edit lands
    pub target: PatchTarget,
    pub status: IssueStatus,
}

/// Summary for a review UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub total: usize,
    pub resolved: usize,
    pub pending_automatic: usize,
    pub pending_semi_automatic: usize,
    pub pending_manual: usize,
    /// Unresolved critical issues
    pub blocked_by: Vec<IssueId>,
    pub can_proceed: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixWorkflow {
    branch_id: BranchId,
    issues: Vec<FixIssue>,
}

impl FixWorkflow {
    pub fn new(branch_id: BranchId, issues: Vec<FixIssue>) -> Self {
        Self { branch_id, issues }
    }

    #[inline]
    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    #[inline]
    pub fn issues(&self) -> &[FixIssue] {
        &self.issues
    }

    pub fn issue(&self, id: IssueId) -> Option<&FixIssue> {
        self.issues.iter().find(|i| i.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &FixIssue> {
        self.issues.iter().filter(|i| !i.status.is_resolved())
    }

    /// Apply every pending automatic patch, in issue order.
    ///
    /// Returns the patched variation and the ids of the issues resolved.
    pub fn apply_automatic_fixes(
        &mut self,
        variation: &BranchVariation,
    ) -> (BranchVariation, Vec<IssueId>) {
        let mut current = variation.clone();
        let mut applied = Vec::new();
        for issue in self.issues.iter_mut() {
            if issue.fix_type != FixType::Automatic || issue.status.is_resolved() {
                continue;
            }
            if let Some(patch) = &issue.suggested_patch {
                current = patch.apply(&current);
                issue.status = IssueStatus::Applied;
                applied.push(issue.id);
            }
        }
        (current, applied)
    }

    /// Accept the suggested patch of a pending issue.
    pub fn accept(
        &mut self,
        id: IssueId,
        variation: &BranchVariation,
    ) -> Result<BranchVariation, DomainError> {
        let issue = self.pending_issue_mut(id)?;
        let patch = issue.suggested_patch.clone().ok_or_else(|| {
            DomainError::constraint(format!("Issue {} has no suggested patch; edit it instead", id))
        })?;
        issue.status = IssueStatus::Accepted;
        Ok(patch.apply(variation))
    }

    /// Resolve a pending issue with caller-written text at the issue's target.
    pub fn edit(
        &mut self,
        id: IssueId,
        text: impl Into<String>,
        variation: &BranchVariation,
    ) -> Result<BranchVariation, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("Fix text cannot be empty"));
        }
        let issue = self.pending_issue_mut(id)?;
        let patch = FixPatch {
            target: issue.target,
            text,
        };
        issue.status = IssueStatus::Edited;
        Ok(patch.apply(variation))
    }

    /// Dismiss a pending, non-critical issue.
    pub fn dismiss(&mut self, id: IssueId) -> Result<(), DomainError> {
        let issue = self.pending_issue_mut(id)?;
        if issue.severity.is_critical() {
            return Err(DomainError::constraint(format!(
                "Critical issue {} cannot be dismissed",
                id
            )));
        }
        issue.status = IssueStatus::Dismissed;
        Ok(())
    }

    pub fn status(&self) -> WorkflowStatus {
        let pending_of = |fix_type: FixType| self.pending().filter(|i| i.fix_type == fix_type).count();
        let blocked_by: Vec<IssueId> = self
            .pending()
            .filter(|i| i.severity.is_critical())
            .map(|i| i.id)
            .collect();
        let resolved = self.issues.iter().filter(|i| i.status.is_resolved()).count();
        WorkflowStatus {
            total: self.issues.len(),
            resolved,
            pending_automatic: pending_of(FixType::Automatic),
            pending_semi_automatic: pending_of(FixType::SemiAutomatic),
            pending_manual: pending_of(FixType::Manual),
            can_proceed: blocked_by.is_empty(),
            complete: resolved == self.issues.len(),
            blocked_by,
        }
    }

    fn pending_issue_mut(&mut self, id: IssueId) -> Result<&mut FixIssue, DomainError> {
        let issue = self
            .issues
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DomainError::not_found("FixIssue", id.to_string()))?;
        if issue.status.is_resolved() {
            return Err(DomainError::invalid_state_transition(format!(
                "Issue {} is already resolved",
                id
            )));
        }
        Ok(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BranchMood, Complexity, ConsequenceScope, EndingType};
    use crate::value_objects::{BranchPremise, BranchTrajectory, HardRuleCategory, SoftRuleCategory};
    use crate::{AlternativeId, AnchorId, PremiseId};

    fn variation() -> BranchVariation {
        BranchVariation {
            id: BranchId::new(),
            anchor_id: AnchorId::new(),
            premise: BranchPremise {
                id: PremiseId::new(),
                alternative_id: AlternativeId::new(),
                title: "t".into(),
                subtitle: String::new(),
                hook: String::new(),
                what_if: String::new(),
                description: "The gate holds".into(),
                themes: vec![],
                affected_characters: vec![],
                immediate_consequences: vec![],
                long_term_implications: vec![],
            },
            trajectory: BranchTrajectory {
                summary: String::new(),
                key_events: vec![],
                turning_points: vec![],
                climax: String::new(),
                resolution: "Peace returns.".into(),
                ending_type: EndingType::Hopeful,
            },
            consequence_scope: ConsequenceScope::Personal,
            theme_progression: vec![],
            mood: BranchMood::Hopeful,
            complexity: Complexity::Simple,
            estimated_chapters: 3,
            character_arcs: vec![],
        }
    }

    fn issue(severity: Severity, fix_type: FixType, patch: Option<&str>) -> FixIssue {
        FixIssue {
            id: IssueId::new(),
            source: IssueSource::WorldRule {
                rule_id: None,
                kind: if severity.is_critical() {
                    RuleKind::Hard(HardRuleCategory::Physics)
                } else {
                    RuleKind::Soft(SoftRuleCategory::SocialNorms)
                },
            },
            severity,
            fix_type,
            description: "issue".into(),
            suggested_patch: patch.map(|text| FixPatch {
                target: PatchTarget::TrajectoryResolution,
                text: text.into(),
            }),
            target: PatchTarget::TrajectoryResolution,
            status: IssueStatus::Pending,
        }
    }

    #[test]
    fn test_apply_automatic_fixes_only_drains_automatic() {
        let v = variation();
        let auto = issue(Severity::Warning, FixType::Automatic, Some("The custom is honoured."));
        let semi = issue(Severity::Error, FixType::SemiAutomatic, Some("A price is paid."));
        let mut workflow = FixWorkflow::new(v.id, vec![auto.clone(), semi.clone()]);

        let (patched, applied) = workflow.apply_automatic_fixes(&v);

        assert_eq!(applied, vec![auto.id]);
        assert_eq!(patched.trajectory.resolution, "Peace returns. The custom is honoured.");
        assert_eq!(workflow.issue(semi.id).unwrap().status, IssueStatus::Pending);
    }

    #[test]
    fn test_critical_issue_blocks_even_when_everything_else_resolved() {
        let v = variation();
        let critical = issue(Severity::Critical, FixType::Manual, None);
        let minor = issue(Severity::Warning, FixType::Automatic, Some("ok"));
        let mut workflow = FixWorkflow::new(v.id, vec![critical.clone(), minor]);
        workflow.apply_automatic_fixes(&v);

        let status = workflow.status();
        assert!(!status.can_proceed);
        assert_eq!(status.blocked_by, vec![critical.id]);
        assert!(!status.complete);
    }

    #[test]
    fn test_critical_issue_cannot_be_dismissed() {
        let v = variation();
        let critical = issue(Severity::Critical, FixType::Manual, None);
        let mut workflow = FixWorkflow::new(v.id, vec![critical.clone()]);
        assert!(workflow.dismiss(critical.id).is_err());
        assert!(!workflow.status().can_proceed);
    }

    #[test]
    fn test_manual_issue_resolved_by_edit() {
        let v = variation();
        let critical = issue(Severity::Critical, FixType::Manual, None);
        let mut workflow = FixWorkflow::new(v.id, vec![critical.clone()]);

        assert!(workflow.accept(critical.id, &v).is_err());
        let edited = workflow
            .edit(critical.id, "The fall is survived through the established ward.", &v)
            .unwrap();

        assert!(edited.trajectory.resolution.ends_with("established ward."));
        let status = workflow.status();
        assert!(status.can_proceed);
        assert!(status.complete);
    }

    #[test]
    fn test_resolved_issue_cannot_be_resolved_twice() {
        let v = variation();
        let semi = issue(Severity::Error, FixType::SemiAutomatic, Some("x"));
        let mut workflow = FixWorkflow::new(v.id, vec![semi.clone()]);
        workflow.accept(semi.id, &v).unwrap();
        assert!(matches!(
            workflow.dismiss(semi.id),
            Err(DomainError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_unknown_issue_is_not_found() {
        let mut workflow = FixWorkflow::new(BranchId::new(), vec![]);
        assert!(matches!(
            workflow.dismiss(IssueId::new()),
            Err(DomainError::NotFound { .. })
        ));
    }
}
