//! Rule-based critique of a branch.

use branchwright_domain::common::{tokenize, word_count};
use branchwright_domain::{
    BranchVariation, ContextPackage, Critique, CritiqueKind, CritiquePriority,
};

/// Arc descriptions shorter than this read as sketches.
pub(crate) const MIN_ARC_WORDS: usize = 8;
/// Climaxes shorter than this read as placeholders.
pub(crate) const MIN_CLIMAX_WORDS: usize = 10;
pub(crate) const MIN_SUMMARY_WORDS: usize = 8;

/// Critiques for `variation`, most severe first. Ties keep detector order.
pub fn critique(variation: &BranchVariation, context: &ContextPackage) -> Vec<Critique> {
    let mut critiques = Vec::new();
    let mut push = |kind: CritiqueKind, priority: CritiquePriority, message: String| {
        critiques.push(Critique {
            kind,
            area: kind.area(),
            priority,
            message,
        })
    };

    // Characters
    let missing: Vec<&str> = context
        .involved_characters()
        .iter()
        .filter(|c| variation.arc_for(c.id).is_none())
        .map(|c| c.name.as_str())
        .collect();
    if variation.character_arcs.is_empty() || !missing.is_empty() {
        let who = if missing.is_empty() {
            "anyone".to_string()
        } else {
            missing.join(", ")
        };
        push(
            CritiqueKind::MissingArcs,
            CritiquePriority::Major,
            format!("No arc is projected for {}", who),
        );
    }
    let shallow: Vec<&str> = variation
        .character_arcs
        .iter()
        .filter(|a| a.is_static() || word_count(&a.arc_description) < MIN_ARC_WORDS)
        .map(|a| a.character_name.as_str())
        .collect();
    if !shallow.is_empty() {
        push(
            CritiqueKind::ShallowArc,
            CritiquePriority::Moderate,
            format!("Arcs for {} are shallow", shallow.join(", ")),
        );
    }

    // Plot
    let trajectory = &variation.trajectory;
    if trajectory.key_events.len() < 3 || word_count(&trajectory.summary) < MIN_SUMMARY_WORDS {
        push(
            CritiqueKind::ThinPlot,
            CritiquePriority::Major,
            "The trajectory needs more connected events".to_string(),
        );
    }
    if trajectory.turning_points.is_empty() {
        push(
            CritiqueKind::MissingTurningPoints,
            CritiquePriority::Moderate,
            "Nothing turns the story midway".to_string(),
        );
    }

    // Themes
    if variation.premise.themes.is_empty() {
        push(
            CritiqueKind::MissingThemes,
            CritiquePriority::Major,
            "The branch states no themes".to_string(),
        );
    } else if variation.theme_progression.len() < 2 {
        push(
            CritiqueKind::MissingThemes,
            CritiquePriority::Moderate,
            "Themes are named but never develop".to_string(),
        );
    }

    // Climax and stakes
    if word_count(&trajectory.climax) < MIN_CLIMAX_WORDS {
        push(
            CritiqueKind::WeakClimax,
            CritiquePriority::Moderate,
            "The climax is too slight to carry the branch".to_string(),
        );
    }
    let premise = &variation.premise;
    if premise.immediate_consequences.is_empty() || premise.long_term_implications.is_empty() {
        push(
            CritiqueKind::UnclearStakes,
            CritiquePriority::Moderate,
            "What is at stake is never spelled out".to_string(),
        );
    }

    // Pacing and world
    let expected = variation
        .complexity
        .estimated_chapters(variation.character_arcs.len());
    if variation.estimated_chapters != expected {
        push(
            CritiqueKind::PacingMismatch,
            CritiquePriority::Minor,
            format!(
                "{} chapters for a {} branch; expected {}",
                variation.estimated_chapters,
                variation.complexity.as_str(),
                expected
            ),
        );
    }
    let world = &context.world;
    let world_words = world
        .locations
        .iter()
        .chain(world.factions.iter())
        .chain(world.active_conflicts.iter())
        .flat_map(|s| tokenize(s))
        .collect::<std::collections::BTreeSet<_>>();
    if !world_words.is_empty() && world_words.is_disjoint(&tokenize(&variation.narrative_text())) {
        push(
            CritiqueKind::ThinWorld,
            CritiquePriority::Minor,
            "The wider world never appears".to_string(),
        );
    }

    critiques.sort_by(|a, b| b.priority.cmp(&a.priority));
    critiques
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use branchwright_domain::BranchTrajectory;

    #[test]
    fn when_branch_is_complete_then_no_critiques() {
        let context = test_fixtures::context();
        assert!(critique(&test_fixtures::variation(), &context).is_empty());
    }

    #[test]
    fn when_several_problems_then_sorted_major_first() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let weak = base
            .with_trajectory(BranchTrajectory {
                key_events: vec!["The gate holds".into()],
                turning_points: vec![],
                climax: "It ends".into(),
                ..base.trajectory.clone()
            })
            .with_estimated_chapters(12);

        let critiques = critique(&weak, &context);
        let kinds: Vec<_> = critiques.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CritiqueKind::ThinPlot,
                CritiqueKind::MissingTurningPoints,
                CritiqueKind::WeakClimax,
                CritiqueKind::PacingMismatch,
            ]
        );
        assert!(critiques
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn when_involved_character_has_no_arc_then_missing_arcs_names_them() {
        let context = test_fixtures::context();
        let base = test_fixtures::variation();
        let one_arc = base.with_character_arcs(vec![base.character_arcs[0].clone()]);
        let critiques = critique(&one_arc, &context);
        assert_eq!(critiques[0].kind, CritiqueKind::MissingArcs);
        assert!(critiques[0].message.contains("Ilse"));
    }
}
