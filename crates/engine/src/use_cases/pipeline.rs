//! Review pipeline: every validator family plus the fix workflow for a branch.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use branchwright_domain::{
    BlockingIssue, BlockingSource, BranchId, BranchVariation, ContextPackage, DeviationConfig,
    DeviationDecision, DeviationOutcome, FixWorkflow, FullValidationResult,
    TieredValidationResult, WorldRuleId, WorldRulesValidation,
};

use crate::infrastructure::ports::RandomPort;

use super::traits::{DeviationController, TieredTraitValidator};
use super::validation::MultiDimensionalValidator;
use super::world_rules::{FixClassifier, WorldRuleValidator};

/// Everything a review UI needs for one branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchReview {
    pub branch_id: BranchId,
    pub validation: FullValidationResult,
    pub traits: Vec<TieredValidationResult>,
    pub decisions: Vec<DeviationDecision>,
    pub world: WorldRulesValidation,
    pub fixes: FixWorkflow,
    /// Findings that must be acknowledged before the branch can be selected
    pub blocking_issues: Vec<BlockingIssue>,
}

impl BranchReview {
    pub fn is_blocked(&self) -> bool {
        !self.blocking_issues.is_empty()
    }

    /// Recompute blocking issues, e.g. after fixes were applied.
    pub fn refresh_blocking_issues(&mut self) {
        self.blocking_issues = blocking_issues(&self.validation, &self.decisions, &self.fixes);
    }
}

/// Validator findings for one branch, before fixes are classified.
struct Assessment {
    validation: FullValidationResult,
    traits: Vec<TieredValidationResult>,
    decisions: Vec<DeviationDecision>,
    world: WorldRulesValidation,
}

#[derive(Clone)]
pub struct ReviewPipeline {
    validator: MultiDimensionalValidator,
    traits: TieredTraitValidator,
    deviation: DeviationController,
    world: WorldRuleValidator,
    fixes: FixClassifier,
}

impl ReviewPipeline {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self {
            validator: MultiDimensionalValidator::default(),
            traits: TieredTraitValidator::default(),
            deviation: DeviationController::default(),
            world: WorldRuleValidator::default(),
            fixes: FixClassifier::new(random),
        }
    }

    pub fn review(
        &self,
        variation: &BranchVariation,
        context: &ContextPackage,
        config: &DeviationConfig,
    ) -> BranchReview {
        self.review_with_overrides(variation, context, config, &BTreeSet::new())
    }

    /// Review with hard world rules the user has explicitly overridden.
    pub fn review_with_overrides(
        &self,
        variation: &BranchVariation,
        context: &ContextPackage,
        config: &DeviationConfig,
        overrides: &BTreeSet<WorldRuleId>,
    ) -> BranchReview {
        let assessment = self.assess(variation, context, config, overrides);
        self.finish(variation, assessment)
    }

    /// Review disjoint branches in parallel. Output follows input order.
    ///
    /// Validators run on the rayon pool; fix workflows are built in input
    /// order so a seeded random port yields the same issue ids every run.
    pub fn review_all(
        &self,
        variations: &[BranchVariation],
        context: &ContextPackage,
        config: &DeviationConfig,
    ) -> Vec<BranchReview> {
        let overrides = BTreeSet::new();
        let assessments: Vec<Assessment> = variations
            .par_iter()
            .map(|variation| self.assess(variation, context, config, &overrides))
            .collect();
        variations
            .iter()
            .zip(assessments)
            .map(|(variation, assessment)| self.finish(variation, assessment))
            .collect()
    }

    fn assess(
        &self,
        variation: &BranchVariation,
        context: &ContextPackage,
        config: &DeviationConfig,
        overrides: &BTreeSet<WorldRuleId>,
    ) -> Assessment {
        let validation = self.validator.validate_all(variation, context);
        let traits = self.traits.validate_all(context, variation);
        let decisions = self.deviation.decide_all(&traits, config);
        let world = self
            .world
            .validate_with_overrides(variation, &context.world, overrides);
        Assessment {
            validation,
            traits,
            decisions,
            world,
        }
    }

    fn finish(&self, variation: &BranchVariation, assessment: Assessment) -> BranchReview {
        let Assessment {
            validation,
            traits,
            decisions,
            world,
        } = assessment;
        let fixes = self.fixes.build_workflow(variation.id, &traits, &world);
        let blocking_issues = blocking_issues(&validation, &decisions, &fixes);

        tracing::info!(
            branch_id = %variation.id,
            overall_score = validation.overall_score,
            passed = validation.passed,
            rejected = decisions.iter().filter(|d| d.outcome.is_rejected()).count(),
            world_acceptable = world.acceptable,
            fix_issues = fixes.issues().len(),
            blocking = blocking_issues.len(),
            "Reviewed branch"
        );

        BranchReview {
            branch_id: variation.id,
            validation,
            traits,
            decisions,
            world,
            fixes,
            blocking_issues,
        }
    }
}

fn blocking_issues(
    validation: &FullValidationResult,
    decisions: &[DeviationDecision],
    fixes: &FixWorkflow,
) -> Vec<BlockingIssue> {
    let failing = validation.critical_failures.iter().map(|dimension| BlockingIssue {
        source: BlockingSource::Validation,
        description: format!("{} scored below the critical threshold", dimension),
    });
    let rejected = decisions.iter().filter_map(|decision| match &decision.outcome {
        DeviationOutcome::Rejected { reason, .. } => Some(BlockingIssue {
            source: BlockingSource::Deviation,
            description: format!("{}: {}", decision.character_name, reason),
        }),
        _ => None,
    });
    let unresolved = fixes
        .status()
        .blocked_by
        .into_iter()
        .filter_map(|id| fixes.issue(id))
        .map(|issue| BlockingIssue {
            source: BlockingSource::Fix,
            description: issue.description.clone(),
        })
        .collect::<Vec<_>>();

    failing.chain(rejected).chain(unresolved).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SeededRandom;
    use crate::test_fixtures;
    use branchwright_domain::{
        BranchTrajectory, CharacterArcProjection, GrowthType, StrictnessLevel, TraitKind,
    };

    fn pipeline() -> ReviewPipeline {
        ReviewPipeline::new(Arc::new(SeededRandom::new(5)))
    }

    #[test]
    fn when_branch_is_clean_then_nothing_blocks() {
        let context = test_fixtures::context();
        let review = pipeline().review(
            &test_fixtures::variation(),
            &context,
            &DeviationConfig::default(),
        );
        assert!(review.validation.passed);
        assert!(review.world.acceptable);
        assert!(!review.is_blocked());
        assert!(review.fixes.status().can_proceed);
    }

    #[test]
    fn when_hard_rule_broken_then_fix_blocks_until_overridden() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let variation = base.with_trajectory(BranchTrajectory {
            climax: "At the east gate a priest resurrects the fallen defenders of the city".into(),
            ..base.trajectory.clone()
        });
        let pipeline = pipeline();

        let review = pipeline.review(&variation, &context, &DeviationConfig::default());
        assert!(!review.world.acceptable);
        assert!(review
            .blocking_issues
            .iter()
            .any(|i| i.source == BlockingSource::Fix));

        let overrides = context
            .world
            .rules
            .iter()
            .filter(|r| r.kind.is_hard())
            .map(|r| r.id)
            .collect();
        let review =
            pipeline.review_with_overrides(&variation, &context, &DeviationConfig::default(), &overrides);
        assert!(review.world.acceptable);
        assert!(!review.is_blocked());
    }

    #[test]
    fn when_protected_trait_is_violated_then_deviation_blocks() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let arcs: Vec<CharacterArcProjection> = base
            .character_arcs
            .iter()
            .map(|arc| CharacterArcProjection {
                growth: GrowthType::Negative,
                ..arc.clone()
            })
            .collect();
        let variation = base.with_character_arcs(arcs);
        let config = DeviationConfig::with_level(StrictnessLevel::Creative)
            .protect(test_fixtures::mara_id(), TraitKind::MoralAlignment);

        let review = pipeline().review(&variation, &context, &config);
        let mara = review
            .decisions
            .iter()
            .find(|d| d.character_id == test_fixtures::mara_id())
            .unwrap();
        assert!(mara.outcome.is_rejected());
        assert!(mara.outcome.traits().contains(&TraitKind::MoralAlignment));
        assert!(review
            .blocking_issues
            .iter()
            .any(|i| i.source == BlockingSource::Deviation && i.description.starts_with("Mara")));
    }

    #[test]
    fn test_review_all_keeps_input_order() {
        let context = test_fixtures::context();
        let branches = vec![test_fixtures::variation(), test_fixtures::dark_variation()];
        let reviews =
            pipeline().review_all(&branches, &context, &DeviationConfig::default());
        let ids: Vec<BranchId> = reviews.iter().map(|r| r.branch_id).collect();
        assert_eq!(ids, vec![branches[0].id, branches[1].id]);
    }

    #[test]
    fn when_seeded_then_review_all_assigns_the_same_issue_ids() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let broken = base.with_trajectory(BranchTrajectory {
            climax: "At the east gate a priest resurrects the fallen defenders of the city".into(),
            ..base.trajectory.clone()
        });
        let branches = vec![broken, test_fixtures::dark_variation()];
        let issue_ids = |reviews: Vec<BranchReview>| -> Vec<_> {
            reviews
                .iter()
                .flat_map(|r| r.fixes.issues().iter().map(|i| i.id))
                .collect()
        };

        let first = issue_ids(pipeline().review_all(&branches, &context, &DeviationConfig::default()));
        let second = issue_ids(pipeline().review_all(&branches, &context, &DeviationConfig::default()));
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
