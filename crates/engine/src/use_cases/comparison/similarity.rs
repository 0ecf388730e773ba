//! Pairwise branch similarity across the eight comparison dimensions.
//!
//! Every measure here is symmetric in its two arguments.

use std::collections::{BTreeMap, BTreeSet};

use branchwright_domain::common::{clamp_score, jaccard, mean, tokenize};
use branchwright_domain::{
    BranchComparison, BranchVariation, CharacterArcProjection, CharacterFateComparison,
    CharacterId, ComparisonDimension, DimensionSimilarity, FateDivergence,
};

const SAME_FATE: f64 = 0.8;
const SIMILAR_FATE: f64 = 0.5;

/// Compare two branches.
pub fn compare_pair(a: &BranchVariation, b: &BranchVariation) -> BranchComparison {
    let character_fates = character_fates(a, b);
    let dimensions: Vec<DimensionSimilarity> = ComparisonDimension::ALL
        .iter()
        .map(|&dimension| DimensionSimilarity {
            dimension,
            similarity: clamp_score(dimension_similarity(dimension, a, b, &character_fates)),
        })
        .collect();
    let scores: Vec<f64> = dimensions.iter().map(|d| d.similarity).collect();
    let overall_similarity = mean(&scores).unwrap_or(0.0);

    BranchComparison {
        branch_a: a.id,
        branch_b: b.id,
        key_differences: key_differences(a, b, &character_fates),
        shared_elements: shared_elements(a, b),
        dimensions,
        character_fates,
        overall_similarity,
    }
}

fn dimension_similarity(
    dimension: ComparisonDimension,
    a: &BranchVariation,
    b: &BranchVariation,
    fates: &[CharacterFateComparison],
) -> f64 {
    match dimension {
        ComparisonDimension::PremiseSimilarity => {
            let text = |v: &BranchVariation| {
                tokenize(&format!("{} {}", v.premise.what_if, v.premise.description))
            };
            0.6 * jaccard(&text(a), &text(b))
                + 0.4 * same(a.premise.alternative_id == b.premise.alternative_id)
        }
        ComparisonDimension::CharacterFateOverlap => {
            let scores: Vec<f64> = fates.iter().map(|f| f.similarity).collect();
            mean(&scores).unwrap_or(1.0)
        }
        ComparisonDimension::ThemeAlignment => jaccard(&a.theme_set(), &b.theme_set()),
        ComparisonDimension::EndingContrast => {
            let (x, y) = (a.trajectory.ending_type, b.trajectory.ending_type);
            if x == y {
                1.0
            } else if x.is_related(&y) {
                0.5
            } else {
                0.0
            }
        }
        ComparisonDimension::EmotionalArcMatch => {
            0.6 * same(a.mood == b.mood) + 0.4 * jaccard(&growth_set(a), &growth_set(b))
        }
        ComparisonDimension::ConsequenceScopeMatch => {
            1.0 - f64::from(a.consequence_scope.distance(&b.consequence_scope)) / 2.0
        }
        ComparisonDimension::StructuralSimilarity => {
            let beats = |v: &BranchVariation| {
                (v.trajectory.key_events.len() + v.trajectory.turning_points.len()) as f64
            };
            0.4 * same(a.complexity == b.complexity)
                + 0.3 * closeness(f64::from(a.estimated_chapters), f64::from(b.estimated_chapters))
                + 0.3 * closeness(beats(a), beats(b))
        }
        ComparisonDimension::ReaderExperienceMatch => {
            let payoff = |v: &BranchVariation| {
                tokenize(&format!("{} {}", v.trajectory.climax, v.trajectory.resolution))
            };
            0.5 * same(a.mood == b.mood) + 0.5 * jaccard(&payoff(a), &payoff(b))
        }
    }
}

/// One entry per character with an arc in either branch, ordered by id.
///
/// A character present in only one branch scores 0 with `Complete` divergence.
pub fn character_fates(a: &BranchVariation, b: &BranchVariation) -> Vec<CharacterFateComparison> {
    fn index(v: &BranchVariation) -> BTreeMap<CharacterId, &CharacterArcProjection> {
        v.character_arcs.iter().map(|arc| (arc.character_id, arc)).collect()
    }
    let (left, right) = (index(a), index(b));
    let ids: BTreeSet<CharacterId> = left.keys().chain(right.keys()).copied().collect();

    ids.into_iter()
        .filter_map(|id| match (left.get(&id), right.get(&id)) {
            (Some(x), Some(y)) => {
                let similarity = 0.5 * same(x.growth == y.growth)
                    + 0.5 * jaccard(&tokenize(&x.ending_state), &tokenize(&y.ending_state));
                let divergence = if similarity >= SAME_FATE {
                    FateDivergence::Same
                } else if similarity >= SIMILAR_FATE {
                    FateDivergence::Similar
                } else {
                    FateDivergence::Different
                };
                Some(CharacterFateComparison {
                    character_id: id,
                    character_name: x.character_name.clone(),
                    similarity,
                    divergence,
                })
            }
            (Some(only), None) | (None, Some(only)) => Some(CharacterFateComparison {
                character_id: id,
                character_name: only.character_name.clone(),
                similarity: 0.0,
                divergence: FateDivergence::Complete,
            }),
            (None, None) => None,
        })
        .collect()
}

fn key_differences(
    a: &BranchVariation,
    b: &BranchVariation,
    fates: &[CharacterFateComparison],
) -> Vec<String> {
    let mut differences = Vec::new();
    if a.mood != b.mood {
        differences.push(format!("Mood: {} vs {}", a.mood.as_str(), b.mood.as_str()));
    }
    if a.trajectory.ending_type != b.trajectory.ending_type {
        differences.push(format!(
            "Ending: {} vs {}",
            a.trajectory.ending_type, b.trajectory.ending_type
        ));
    }
    if a.consequence_scope != b.consequence_scope {
        differences.push(format!(
            "Scope: {} vs {}",
            a.consequence_scope, b.consequence_scope
        ));
    }
    if a.complexity != b.complexity {
        differences.push(format!(
            "Complexity: {} vs {}",
            a.complexity.as_str(),
            b.complexity.as_str()
        ));
    }
    for fate in fates {
        match fate.divergence {
            FateDivergence::Complete => differences.push(format!(
                "{} has an arc in only one branch",
                fate.character_name
            )),
            FateDivergence::Different => {
                differences.push(format!("{} ends up somewhere else", fate.character_name))
            }
            FateDivergence::Same | FateDivergence::Similar => {}
        }
    }
    differences
}

fn shared_elements(a: &BranchVariation, b: &BranchVariation) -> Vec<String> {
    let mut shared = Vec::new();
    if a.mood == b.mood {
        shared.push(format!("Mood: {}", a.mood.as_str()));
    }
    if a.trajectory.ending_type == b.trajectory.ending_type {
        shared.push(format!("Ending: {}", a.trajectory.ending_type));
    }
    if a.consequence_scope == b.consequence_scope {
        shared.push(format!("Scope: {}", a.consequence_scope));
    }
    shared.extend(
        a.theme_set()
            .intersection(&b.theme_set())
            .map(|theme| format!("Theme: {}", theme)),
    );
    shared
}

fn growth_set(variation: &BranchVariation) -> BTreeSet<&'static str> {
    variation
        .character_arcs
        .iter()
        .map(|arc| arc.growth.as_str())
        .collect()
}

/// 1 for equal magnitudes, falling toward 0 as they diverge.
fn closeness(x: f64, y: f64) -> f64 {
    let largest = x.max(y);
    if largest <= 0.0 {
        return 1.0;
    }
    1.0 - (x - y).abs() / largest
}

fn same(equal: bool) -> f64 {
    if equal {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use branchwright_domain::BranchId;

    #[test]
    fn when_branches_are_identical_then_every_dimension_is_one() {
        let a = test_fixtures::variation();
        let b = a.as_sibling(BranchId::new());
        let comparison = compare_pair(&a, &b);
        assert!(comparison.dimensions.iter().all(|d| d.similarity == 1.0));
        assert_eq!(comparison.overall_similarity, 1.0);
        assert!(comparison.key_differences.is_empty());
        assert!(comparison.shared_elements.contains(&"Mood: hopeful".to_string()));
    }

    #[test]
    fn when_branches_differ_then_differences_are_listed() {
        let hopeful = test_fixtures::variation();
        let dark = test_fixtures::dark_variation();
        let comparison = compare_pair(&hopeful, &dark);

        assert!(comparison.overall_similarity < 0.7);
        assert_eq!(
            comparison.similarity(ComparisonDimension::ConsequenceScopeMatch),
            Some(0.0)
        );
        assert!(comparison
            .key_differences
            .contains(&"Mood: hopeful vs dark".to_string()));
        assert!(comparison
            .key_differences
            .contains(&"Scope: personal vs cosmic".to_string()));
    }

    #[test]
    fn when_character_missing_from_one_branch_then_fate_is_complete_divergence() {
        let full = test_fixtures::variation();
        let partial = full
            .with_character_arcs(vec![full.character_arcs[0].clone()])
            .as_sibling(BranchId::new());
        let fates = character_fates(&full, &partial);

        assert_eq!(fates.len(), 2);
        let ilse = fates
            .iter()
            .find(|f| f.character_id == test_fixtures::ilse_id())
            .unwrap();
        assert_eq!(ilse.similarity, 0.0);
        assert_eq!(ilse.divergence, FateDivergence::Complete);
        let mara = fates
            .iter()
            .find(|f| f.character_id == test_fixtures::mara_id())
            .unwrap();
        assert_eq!(mara.divergence, FateDivergence::Same);
    }

    #[test]
    fn test_closeness() {
        assert_eq!(closeness(0.0, 0.0), 1.0);
        assert_eq!(closeness(6.0, 6.0), 1.0);
        assert_eq!(closeness(3.0, 6.0), 0.5);
    }
}
