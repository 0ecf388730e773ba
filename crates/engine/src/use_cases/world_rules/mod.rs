//! World rule validation.
//!
//! Hard rules are never negotiable: a violation is `critical` when the rule
//! is critical, `error` otherwise, and makes the branch unacceptable unless
//! the rule is overridden upstream. Soft rules are bent (a `warning`) when the
//! story motivates the strain, and broken (an `error`) when it does not.

mod detectors;
mod fixes;

pub use fixes::{FixClassifier, FixWorkflowError};

use std::collections::BTreeSet;

use branchwright_domain::common::sentences;
use branchwright_domain::{
    BranchVariation, HardRuleCategory, Importance, RuleKind, RuleViolation, Severity,
    SoftRuleCategory, SoftRuleOutcome, WorldRuleId, WorldRulesValidation, WorldState,
};

use detectors::{is_justified, RuleDetector};

#[derive(Debug, Default, Clone, Copy)]
pub struct WorldRuleValidator;

impl WorldRuleValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check a branch against every rule of the world.
    pub fn validate(&self, variation: &BranchVariation, world: &WorldState) -> WorldRulesValidation {
        self.validate_with_overrides(variation, world, &BTreeSet::new())
    }

    /// As `validate`, but hard violations of the `overridden` rules stay in
    /// the report flagged `overridden` and no longer block acceptance.
    pub fn validate_with_overrides(
        &self,
        variation: &BranchVariation,
        world: &WorldState,
        overridden: &BTreeSet<WorldRuleId>,
    ) -> WorldRulesValidation {
        let text = variation.narrative_text();
        let mut hard = Vec::new();
        let mut soft = Vec::new();

        for rule in &world.rules {
            let detector = RuleDetector::new(rule);
            let Some(evidence) = detector.first_match(&text) else {
                continue;
            };
            match rule.kind {
                RuleKind::Hard(_) => hard.push(RuleViolation {
                    rule_id: Some(rule.id),
                    kind: rule.kind,
                    severity: hard_severity(rule.importance),
                    description: format!("Breaks hard rule: {}", rule.description),
                    evidence: evidence.to_string(),
                    soft_outcome: None,
                    overridden: overridden.contains(&rule.id),
                }),
                RuleKind::Soft(category) => {
                    let bent = is_justified(evidence)
                        || (category == SoftRuleCategory::PoliticalStructure
                            && !world.active_conflicts.is_empty());
                    let (outcome, severity, verb) = if bent {
                        (SoftRuleOutcome::Bent, Severity::Warning, "Bends")
                    } else {
                        (SoftRuleOutcome::Broken, Severity::Error, "Breaks")
                    };
                    soft.push(RuleViolation {
                        rule_id: Some(rule.id),
                        kind: rule.kind,
                        severity,
                        description: format!("{} soft rule: {}", verb, rule.description),
                        evidence: evidence.to_string(),
                        soft_outcome: Some(outcome),
                        overridden: false,
                    });
                }
            }
        }

        hard.extend(self.deceased_violations(variation, world, overridden));

        let report = WorldRulesValidation::new(variation.id, hard, soft);
        tracing::debug!(
            branch_id = %variation.id,
            hard = report.hard_violations.len(),
            soft_bent = report.soft_bent,
            soft_broken = report.soft_broken,
            acceptable = report.acceptable,
            "Validated world rules"
        );
        report
    }

    /// Characters dead by the anchor who act in the branch.
    ///
    /// Attributed to the world's first past-event-permanence rule when it
    /// declares one, so overriding that rule covers these too.
    fn deceased_violations(
        &self,
        variation: &BranchVariation,
        world: &WorldState,
        overridden: &BTreeSet<WorldRuleId>,
    ) -> Vec<RuleViolation> {
        let kind = RuleKind::Hard(HardRuleCategory::PastEventPermanence);
        let rule_id = world
            .rules
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.id);
        let arc_text: Vec<String> = variation.character_arcs.iter().map(|a| a.text()).collect();

        world
            .deceased_characters
            .iter()
            .filter(|name| !name.trim().is_empty())
            .filter_map(|name| {
                let name_lower = name.trim().to_lowercase();
                let has_arc = variation
                    .character_arcs
                    .iter()
                    .any(|a| a.character_name.trim().to_lowercase() == name_lower);
                let evidence = if has_arc {
                    Some(format!("{} has a projected arc", name.trim()))
                } else {
                    arc_text
                        .iter()
                        .flat_map(|t| sentences(t))
                        .find(|s| s.to_lowercase().contains(&name_lower))
                        .map(str::to_string)
                }?;
                Some(RuleViolation {
                    rule_id,
                    kind,
                    severity: Severity::Critical,
                    description: format!("{} died before the anchor", name.trim()),
                    evidence,
                    soft_outcome: None,
                    overridden: rule_id.is_some_and(|id| overridden.contains(&id)),
                })
            })
            .collect()
    }
}

fn hard_severity(importance: Importance) -> Severity {
    match importance {
        Importance::Critical => Severity::Critical,
        Importance::Major | Importance::Minor => Severity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use branchwright_domain::{BranchTrajectory, WorldRule};

    fn with_climax(variation: &BranchVariation, climax: &str) -> BranchVariation {
        variation.with_trajectory(BranchTrajectory {
            climax: climax.into(),
            ..variation.trajectory.clone()
        })
    }

    fn rule_id(context: &branchwright_domain::ContextPackage, hard: bool) -> WorldRuleId {
        context
            .world
            .rules
            .iter()
            .find(|r| r.kind.is_hard() == hard)
            .map(|r| r.id)
            .unwrap()
    }

    #[test]
    fn when_branch_touches_no_rule_then_report_is_clean() {
        let context = test_fixtures::context();
        let report = WorldRuleValidator::new().validate(&test_fixtures::variation(), &context.world);
        assert!(report.is_clean());
        assert!(report.acceptable);
    }

    #[test]
    fn when_critical_hard_rule_is_broken_then_branch_is_unacceptable() {
        let context = test_fixtures::context();
        let variation = with_climax(
            &test_fixtures::variation(),
            "Mara's grief-mage raises the dead to hold the wall",
        );
        let report = WorldRuleValidator::new().validate(&variation, &context.world);

        assert_eq!(report.hard_violations.len(), 1);
        assert_eq!(report.hard_violations[0].severity, Severity::Critical);
        assert!(report.hard_violations[0].evidence.contains("raises the dead"));
        assert!(!report.acceptable);
    }

    #[test]
    fn when_hard_rule_is_overridden_then_reported_but_acceptable() {
        let context = test_fixtures::context();
        let variation = with_climax(&test_fixtures::variation(), "A priest resurrects the fallen");
        let overrides = BTreeSet::from([rule_id(&context, true)]);
        let report = WorldRuleValidator::new().validate_with_overrides(
            &variation,
            &context.world,
            &overrides,
        );

        assert_eq!(report.hard_violations.len(), 1);
        assert!(report.hard_violations[0].overridden);
        assert!(report.acceptable);
    }

    #[test]
    fn when_soft_rule_strained_without_reason_then_broken() {
        let mut context = test_fixtures::context();
        context.world.active_conflicts.clear();
        let variation = with_climax(&test_fixtures::variation(), "The Warden is deposed at dawn");
        let report = WorldRuleValidator::new().validate(&variation, &context.world);

        assert_eq!(report.soft_broken, 1);
        assert_eq!(report.soft_violations[0].severity, Severity::Error);
        assert_eq!(report.soft_violations[0].rule_id, Some(rule_id(&context, false)));
        assert!(report.acceptable);
    }

    #[test]
    fn when_political_rule_strained_during_conflict_then_bent() {
        let context = test_fixtures::context();
        let variation = with_climax(&test_fixtures::variation(), "The Warden is deposed at dawn");
        let report = WorldRuleValidator::new().validate(&variation, &context.world);

        assert_eq!(report.soft_bent, 1);
        assert_eq!(report.soft_violations[0].severity, Severity::Warning);
    }

    #[test]
    fn when_deceased_character_has_arc_then_critical_violation() {
        let mut context = test_fixtures::context();
        context.world.deceased_characters.push("Ilse".into());
        let report = WorldRuleValidator::new().validate(&test_fixtures::variation(), &context.world);

        let violation = &report.hard_violations[0];
        assert_eq!(
            violation.kind,
            RuleKind::Hard(HardRuleCategory::PastEventPermanence)
        );
        assert_eq!(violation.severity, Severity::Critical);
        assert_eq!(violation.rule_id, None);
        assert!(!report.acceptable);
    }

    #[test]
    fn when_minor_hard_rule_is_broken_then_severity_is_error() {
        let mut context = test_fixtures::context();
        context.world.rules = vec![WorldRule {
            id: WorldRuleId::new(),
            kind: RuleKind::Hard(HardRuleCategory::EstablishedPowers),
            importance: Importance::Minor,
            description: "Only mages wield fire".into(),
            patterns: vec![],
        }];
        let variation = with_climax(
            &test_fixtures::variation(),
            "Mara suddenly gains command of fire",
        );
        let report = WorldRuleValidator::new().validate(&variation, &context.world);
        assert_eq!(report.hard_violations[0].severity, Severity::Error);
    }
}
