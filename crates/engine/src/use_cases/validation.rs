//! Multi-dimensional branch validation.
//!
//! Scores a `BranchVariation` on eight independent narrative dimensions. Each
//! dimension starts at a baseline and applies fixed additive adjustments;
//! the aggregate is the unweighted mean. Pure: identical inputs always yield
//! identical results and nothing is mutated.

use std::collections::BTreeSet;

use branchwright_domain::common::{clamp_score, mean, tokenize, word_count};
use branchwright_domain::{
    BranchMood, BranchVariation, ContextPackage, DimensionValidation, FullValidationResult,
    PacingStyle, ToneRegister, ValidationDimension,
};

/// Starting score of every dimension before adjustments.
pub const BASELINE_SCORE: f64 = 0.7;

// =============================================================================
// Score accumulator
// =============================================================================

struct DimensionScore {
    dimension: ValidationDimension,
    score: f64,
    issues: Vec<String>,
    strengths: Vec<String>,
}

impl DimensionScore {
    fn new(dimension: ValidationDimension) -> Self {
        Self {
            dimension,
            score: BASELINE_SCORE,
            issues: Vec::new(),
            strengths: Vec::new(),
        }
    }

    fn penalize(&mut self, amount: f64, issue: impl Into<String>) {
        self.score -= amount;
        self.issues.push(issue.into());
    }

    fn reward(&mut self, amount: f64, strength: impl Into<String>) {
        self.score += amount;
        self.strengths.push(strength.into());
    }

    fn finish(self) -> DimensionValidation {
        let score = clamp_score(self.score);
        DimensionValidation {
            dimension: self.dimension,
            score,
            passed: score >= DimensionValidation::PASS_THRESHOLD,
            issues: self.issues,
            strengths: self.strengths,
        }
    }
}

// =============================================================================
// Validator
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct MultiDimensionalValidator;

impl MultiDimensionalValidator {
    pub fn new() -> Self {
        Self
    }

    /// Score all eight dimensions and aggregate them.
    pub fn validate_all(
        &self,
        variation: &BranchVariation,
        context: &ContextPackage,
    ) -> FullValidationResult {
        let dimensions: Vec<DimensionValidation> = ValidationDimension::ALL
            .iter()
            .map(|dimension| self.validate_dimension(*dimension, variation, context))
            .collect();

        let scores: Vec<f64> = dimensions.iter().map(|d| d.score).collect();
        let overall_score = clamp_score(mean(&scores).unwrap_or(0.0));

        let critical_failures: Vec<ValidationDimension> = dimensions
            .iter()
            .filter(|d| d.is_critical_failure())
            .map(|d| d.dimension)
            .collect();

        let recommendations: Vec<String> = dimensions
            .iter()
            .filter(|d| d.score < DimensionValidation::RECOMMENDATION_THRESHOLD)
            .filter_map(|d| d.issues.first().cloned())
            .collect();

        let passed =
            overall_score >= DimensionValidation::PASS_THRESHOLD && critical_failures.is_empty();

        tracing::debug!(
            branch_id = %variation.id,
            overall_score,
            passed,
            critical_failures = critical_failures.len(),
            "Validated branch dimensions"
        );

        FullValidationResult {
            branch_id: variation.id,
            dimensions,
            overall_score,
            passed,
            critical_failures,
            recommendations,
        }
    }

    /// Score a single dimension.
    pub fn validate_dimension(
        &self,
        dimension: ValidationDimension,
        variation: &BranchVariation,
        context: &ContextPackage,
    ) -> DimensionValidation {
        let mut score = DimensionScore::new(dimension);
        match dimension {
            ValidationDimension::CharacterConsistency => {
                character_consistency(&mut score, variation, context)
            }
            ValidationDimension::WorldConsistency => {
                world_consistency(&mut score, variation, context)
            }
            ValidationDimension::PlotPlausibility => plot_plausibility(&mut score, variation),
            ValidationDimension::ThematicCoherence => {
                thematic_coherence(&mut score, variation, context)
            }
            ValidationDimension::ToneConsistency => tone_consistency(&mut score, variation, context),
            ValidationDimension::PacingBalance => pacing_balance(&mut score, variation, context),
            ValidationDimension::StakesClarity => stakes_clarity(&mut score, variation),
            ValidationDimension::NarrativeSatisfaction => {
                narrative_satisfaction(&mut score, variation)
            }
        }
        score.finish()
    }
}

// =============================================================================
// Dimension rules
// =============================================================================

fn character_consistency(
    score: &mut DimensionScore,
    variation: &BranchVariation,
    context: &ContextPackage,
) {
    if variation.character_arcs.is_empty() {
        score.penalize(0.3, "No character arcs are projected");
        return;
    }

    let involved = context.involved_characters();
    let mut all_covered = true;
    for character in &involved {
        if variation.arc_for(character.id).is_none() {
            all_covered = false;
            score.penalize(0.15, format!("{} has no projected arc", character.name));
        }
    }
    if all_covered && !involved.is_empty() {
        score.reward(0.1, "Every involved character has an arc");
    }

    for arc in &variation.character_arcs {
        if arc.is_static() {
            score.penalize(0.1, format!("{} ends where they started", arc.character_name));
        }
        let reverses = context
            .character(arc.character_id)
            .and_then(|c| c.established_growth)
            .is_some_and(|established| established.reverses(&arc.growth));
        if reverses {
            score.penalize(
                0.1,
                format!("{} reverses their established arc", arc.character_name),
            );
        }
    }
}

fn world_consistency(
    score: &mut DimensionScore,
    variation: &BranchVariation,
    context: &ContextPackage,
) {
    let world = &context.world;

    for arc in &variation.character_arcs {
        let deceased = world
            .deceased_characters
            .iter()
            .any(|name| name.trim().eq_ignore_ascii_case(arc.character_name.trim()));
        if deceased {
            score.penalize(
                0.3,
                format!("{} is dead by the anchor but has an arc", arc.character_name),
            );
        }
    }

    if world.setting.trim().is_empty() && world.locations.is_empty() {
        score.penalize(0.1, "World context is thin: no setting or locations");
    }

    let narrative = tokenize(&variation.narrative_text());
    if !world.active_conflicts.is_empty() {
        let engaged = world
            .active_conflicts
            .iter()
            .any(|conflict| !tokenize(conflict).is_disjoint(&narrative));
        if engaged {
            score.reward(0.1, "Engages the world's active conflicts");
        } else {
            score.penalize(0.1, "Ignores the world's active conflicts");
        }
    }

    let mentions_faction = world
        .factions
        .iter()
        .any(|faction| !tokenize(faction).is_disjoint(&narrative));
    if mentions_faction {
        score.reward(0.05, "Ties into established factions");
    }
}

fn plot_plausibility(score: &mut DimensionScore, variation: &BranchVariation) {
    let trajectory = &variation.trajectory;

    if trajectory.summary.trim().is_empty() {
        score.penalize(0.1, "Trajectory has no summary");
    }
    if trajectory.key_events.len() < 3 {
        score.penalize(0.2, "Fewer than three key events");
    } else {
        score.reward(0.05, "Key events give the plot a clear spine");
    }
    if trajectory.turning_points.is_empty() {
        score.penalize(0.15, "No turning points");
    }
    if trajectory.climax.trim().is_empty() {
        score.penalize(0.2, "No climax");
    }
    if trajectory.resolution.trim().is_empty() {
        score.penalize(0.2, "No resolution");
    } else {
        score.reward(0.15, "The trajectory resolves");
    }
}

fn thematic_coherence(
    score: &mut DimensionScore,
    variation: &BranchVariation,
    context: &ContextPackage,
) {
    let themes = &variation.premise.themes;
    if themes.is_empty() {
        score.penalize(0.3, "The premise carries no themes");
        return;
    }
    if variation.theme_progression.len() < 2 {
        score.penalize(0.15, "Themes do not progress");
    }

    let premise_themes: BTreeSet<String> = themes.iter().map(|t| t.to_lowercase()).collect();
    let carried = variation
        .theme_progression
        .iter()
        .any(|t| premise_themes.contains(&t.to_lowercase()));
    if carried {
        score.reward(0.1, "Premise themes carry through the progression");
    } else {
        score.penalize(0.1, "The progression drops the premise themes");
    }

    let recurring = context
        .style
        .recurring_themes
        .iter()
        .any(|t| premise_themes.contains(&t.trim().to_lowercase()));
    if recurring {
        score.reward(0.1, "Echoes the work's recurring themes");
    }
}

fn tone_consistency(
    score: &mut DimensionScore,
    variation: &BranchVariation,
    context: &ContextPackage,
) {
    if variation.mood_matches_ending() {
        score.reward(0.05, "Ending fits the mood");
    } else {
        score.penalize(
            0.3,
            format!(
                "A {} ending contradicts the {} mood",
                variation.trajectory.ending_type.as_str(),
                variation.mood.as_str()
            ),
        );
    }

    match (context.style.tone, variation.mood) {
        (ToneRegister::Light, BranchMood::Dark) => {
            score.penalize(0.15, "A dark branch clashes with the work's light tone")
        }
        (ToneRegister::Dark, BranchMood::Hopeful) => {
            score.penalize(0.1, "A hopeful branch softens the work's dark tone")
        }
        (ToneRegister::Light, BranchMood::Hopeful)
        | (ToneRegister::Dark, BranchMood::Dark | BranchMood::Tragic) => {
            score.reward(0.1, "Mood matches the work's tone")
        }
        _ => {}
    }

    let allowed = variation.mood.growth_options();
    for arc in &variation.character_arcs {
        if !allowed.contains(&arc.growth) {
            score.penalize(
                0.1,
                format!("{}'s {} arc is off-mood", arc.character_name, arc.growth.as_str()),
            );
        }
    }
}

fn pacing_balance(
    score: &mut DimensionScore,
    variation: &BranchVariation,
    context: &ContextPackage,
) {
    let chapters = variation.estimated_chapters;
    let base = variation.complexity.base_chapters();
    let expected = variation
        .complexity
        .estimated_chapters(variation.character_arcs.len());

    if chapters < base {
        score.penalize(0.2, "Too few chapters for the branch's complexity");
    } else if chapters > expected + 3 {
        score.penalize(0.1, "More chapters than the branch's complexity supports");
    } else {
        score.reward(0.05, "Chapter count fits the complexity");
    }

    match context.style.pacing {
        PacingStyle::Fast if chapters > 8 => {
            score.penalize(0.1, "Too long for the work's fast pacing")
        }
        PacingStyle::Slow if chapters < 4 => {
            score.penalize(0.1, "Too short for the work's slow pacing")
        }
        _ => {}
    }

    let beats = variation.trajectory.key_events.len() + variation.trajectory.turning_points.len();
    if beats as u32 * 2 < chapters {
        score.penalize(0.1, "Too few story beats for the chapter count");
    } else if !variation.trajectory.turning_points.is_empty() {
        score.reward(0.05, "Turning points break up the key events");
    }
}

fn stakes_clarity(score: &mut DimensionScore, variation: &BranchVariation) {
    let premise = &variation.premise;
    if premise.immediate_consequences.is_empty() {
        score.penalize(0.25, "Immediate consequences are not stated");
    } else {
        score.reward(0.1, "Immediate consequences are explicit");
    }
    if premise.long_term_implications.is_empty() {
        score.penalize(0.15, "Long-term implications are not stated");
    }
    if premise.what_if.trim().is_empty() {
        score.penalize(0.1, "The branch poses no what-if question");
    }
    if premise.affected_characters.is_empty() {
        score.penalize(0.1, "No one is named as affected");
    }
}

fn narrative_satisfaction(score: &mut DimensionScore, variation: &BranchVariation) {
    let trajectory = &variation.trajectory;
    if trajectory.resolution.trim().is_empty() {
        score.penalize(0.2, "The story never resolves");
    } else {
        score.reward(0.15, "The story reaches a resolution");
    }
    if word_count(&trajectory.climax) < 6 {
        score.penalize(0.1, "The climax is underdeveloped");
    }
    if variation.mood_matches_ending() {
        score.reward(0.05, "The ending pays off the mood");
    }
    if !variation.character_arcs.is_empty()
        && variation.character_arcs.iter().all(|arc| !arc.is_static())
    {
        score.reward(0.05, "Every arc goes somewhere");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use branchwright_domain::{BranchTrajectory, EndingType};

    #[test]
    fn when_variation_is_complete_then_it_passes() {
        let context = test_fixtures::context();
        let result = MultiDimensionalValidator::new()
            .validate_all(&test_fixtures::variation(), &context);

        assert_eq!(result.dimensions.len(), 8);
        assert!(result.passed);
        assert!(result.critical_failures.is_empty());
    }

    #[test]
    fn when_variation_has_no_arcs_then_character_dimension_drops() {
        let context = test_fixtures::context();
        let variation = test_fixtures::variation().with_character_arcs(vec![]);
        let result = MultiDimensionalValidator::new().validate_all(&variation, &context);

        let character = result
            .dimension(ValidationDimension::CharacterConsistency)
            .unwrap();
        assert!((character.score - 0.4).abs() < 1e-9);
        assert_eq!(character.issues[0], "No character arcs are projected");
    }

    #[test]
    fn when_mood_and_ending_conflict_then_tone_is_penalized() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let broken = base.with_trajectory(BranchTrajectory {
            ending_type: EndingType::Tragic,
            ..base.trajectory.clone()
        });
        let validator = MultiDimensionalValidator::new();

        let before = validator.validate_dimension(ValidationDimension::ToneConsistency, &base, &context);
        let after =
            validator.validate_dimension(ValidationDimension::ToneConsistency, &broken, &context);
        assert!(after.score < before.score);
        assert!(after.issues.iter().any(|i| i.contains("contradicts")));
    }

    #[test]
    fn when_plot_is_hollow_then_critical_failure_and_recommendation() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let hollow = base.with_trajectory(BranchTrajectory {
            summary: String::new(),
            key_events: vec![],
            turning_points: vec![],
            climax: String::new(),
            resolution: String::new(),
            ending_type: base.trajectory.ending_type,
        });
        let result = MultiDimensionalValidator::new().validate_all(&hollow, &context);

        assert!(result
            .critical_failures
            .contains(&ValidationDimension::PlotPlausibility));
        assert!(!result.passed);
        assert!(result
            .recommendations
            .contains(&"Trajectory has no summary".to_string()));
    }

    #[test]
    fn when_validated_twice_then_results_are_identical() {
        let context = test_fixtures::context();
        let variation = test_fixtures::variation();
        let validator = MultiDimensionalValidator::new();
        assert_eq!(
            validator.validate_all(&variation, &context),
            validator.validate_all(&variation, &context)
        );
    }

    #[test]
    fn when_arc_belongs_to_deceased_character_then_world_dimension_flags_it() {
        let mut context = test_fixtures::context();
        let variation = test_fixtures::variation();
        context
            .world
            .deceased_characters
            .push(variation.character_arcs[0].character_name.clone());
        let world = MultiDimensionalValidator::new().validate_dimension(
            ValidationDimension::WorldConsistency,
            &variation,
            &context,
        );
        assert!(world.issues.iter().any(|i| i.contains("is dead")));
    }

    #[test]
    fn test_overall_score_is_mean_of_dimensions() {
        let context = test_fixtures::context();
        let result = MultiDimensionalValidator::new()
            .validate_all(&test_fixtures::variation(), &context);
        let sum: f64 = result.dimensions.iter().map(|d| d.score).sum();
        assert!((result.overall_score - sum / 8.0).abs() < 1e-9);
        for dimension in &result.dimensions {
            assert!((0.0..=1.0).contains(&dimension.score));
        }
    }
}
