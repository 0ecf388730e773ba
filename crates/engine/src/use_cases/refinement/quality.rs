//! Composite quality score used to measure refinement progress.

use branchwright_domain::common::{clamp_score, mean, word_count};
use branchwright_domain::{BranchVariation, CharacterArcProjection, ContextPackage};

use super::critique::{MIN_ARC_WORDS, MIN_CLIMAX_WORDS};

const ARC_WEIGHT: f64 = 0.25;
const THEME_WEIGHT: f64 = 0.15;
const TRAJECTORY_WEIGHT: f64 = 0.20;
const PREMISE_WEIGHT: f64 = 0.15;
const CHAPTER_FIT_WEIGHT: f64 = 0.10;
const MOOD_WEIGHT: f64 = 0.15;

/// Weighted blend of arc completeness, themes, trajectory and premise
/// completeness, chapter fit and mood/ending alignment. In `[0, 1]`.
pub fn quality_score(variation: &BranchVariation, context: &ContextPackage) -> f64 {
    let score = ARC_WEIGHT * arc_completeness(variation, context)
        + THEME_WEIGHT * theme_score(variation)
        + TRAJECTORY_WEIGHT * trajectory_completeness(variation)
        + PREMISE_WEIGHT * premise_completeness(variation)
        + CHAPTER_FIT_WEIGHT * chapter_fit(variation)
        + MOOD_WEIGHT * flag(variation.mood_matches_ending());
    clamp_score(score)
}

fn arc_completeness(variation: &BranchVariation, context: &ContextPackage) -> f64 {
    let developed = |arc: &CharacterArcProjection| {
        !arc.is_static() && word_count(&arc.arc_description) >= MIN_ARC_WORDS
    };
    let involved = context.involved_characters();
    if involved.is_empty() {
        let scores: Vec<f64> = variation
            .character_arcs
            .iter()
            .map(|a| flag(developed(a)))
            .collect();
        return mean(&scores).unwrap_or(0.0);
    }
    let scores: Vec<f64> = involved
        .iter()
        .map(|c| flag(variation.arc_for(c.id).is_some_and(|a| developed(a))))
        .collect();
    mean(&scores).unwrap_or(0.0)
}

fn theme_score(variation: &BranchVariation) -> f64 {
    let themes = variation.premise.themes.len().min(4) as f64 / 4.0;
    let progression = variation.theme_progression.len().min(4) as f64 / 4.0;
    (themes + progression) / 2.0
}

fn trajectory_completeness(variation: &BranchVariation) -> f64 {
    let t = &variation.trajectory;
    let parts = [
        flag(!t.summary.trim().is_empty()),
        (t.key_events.len().min(3) as f64) / 3.0,
        flag(!t.turning_points.is_empty()),
        flag(word_count(&t.climax) >= MIN_CLIMAX_WORDS),
        flag(!t.resolution.trim().is_empty()),
    ];
    mean(&parts).unwrap_or(0.0)
}

fn premise_completeness(variation: &BranchVariation) -> f64 {
    let p = &variation.premise;
    let parts = [
        flag(!p.hook.trim().is_empty()),
        flag(!p.what_if.trim().is_empty()),
        flag(!p.description.trim().is_empty()),
        flag(!p.immediate_consequences.is_empty()),
        flag(!p.long_term_implications.is_empty()),
    ];
    mean(&parts).unwrap_or(0.0)
}

fn chapter_fit(variation: &BranchVariation) -> f64 {
    let expected = variation
        .complexity
        .estimated_chapters(variation.character_arcs.len());
    let off = variation.estimated_chapters.abs_diff(expected).min(5);
    1.0 - off as f64 / 5.0
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use branchwright_domain::BranchTrajectory;

    #[test]
    fn test_weights_sum_to_one() {
        let total = ARC_WEIGHT
            + THEME_WEIGHT
            + TRAJECTORY_WEIGHT
            + PREMISE_WEIGHT
            + CHAPTER_FIT_WEIGHT
            + MOOD_WEIGHT;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn when_branch_is_complete_then_score_is_one() {
        let context = test_fixtures::context();
        let score = quality_score(&test_fixtures::variation(), &context);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn when_climax_is_weak_then_score_drops() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let weak = base.with_trajectory(BranchTrajectory {
            climax: "It ends".into(),
            ..base.trajectory.clone()
        });
        // One of five trajectory parts lost: 0.2 * 0.2
        let expected = 1.0 - 0.04;
        assert!((quality_score(&weak, &context) - expected).abs() < 1e-9);
    }
}
