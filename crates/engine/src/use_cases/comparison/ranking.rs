//! Reductions over the full pairwise map: rankings, consensus, clusters.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use branchwright_domain::common::{mean, word_count};
use branchwright_domain::{
    BranchComparison, BranchId, BranchRanking, BranchVariation, ConsensusSummary, PairKey,
    RankingCriteria, SimilarityCluster,
};

/// Pairs above this are considered near-duplicates.
pub const CLUSTER_THRESHOLD: f64 = 0.7;

pub(crate) type ComparisonMap = BTreeMap<PairKey, BranchComparison>;

fn similarity(comparisons: &ComparisonMap, a: BranchId, b: BranchId) -> f64 {
    comparisons
        .get(&PairKey::new(a, b))
        .map(|c| c.overall_similarity)
        .unwrap_or(0.0)
}

// =============================================================================
// Rankings
// =============================================================================

/// Rank branches by the mean of five criteria. Ranks run 1..=N without ties;
/// equal scores keep input order.
pub fn rank_branches(branches: &[BranchVariation], comparisons: &ComparisonMap) -> Vec<BranchRanking> {
    let mut scored: Vec<(BranchId, RankingCriteria)> = branches
        .iter()
        .map(|branch| (branch.id, criteria(branch, branches, comparisons)))
        .collect();
    scored.sort_by(|(_, x), (_, y)| y.mean().partial_cmp(&x.mean()).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (branch_id, criteria))| BranchRanking {
            branch_id,
            rank: index + 1,
            score: criteria.mean(),
            criteria,
        })
        .collect()
}

fn criteria(
    branch: &BranchVariation,
    all: &[BranchVariation],
    comparisons: &ComparisonMap,
) -> RankingCriteria {
    let arcs: Vec<f64> = branch
        .character_arcs
        .iter()
        .map(|arc| flag(!arc.is_static()) * 0.6 + flag(word_count(&arc.arc_description) >= 8) * 0.4)
        .collect();
    let character_impact = mean(&arcs).unwrap_or(0.0);

    let thematic_depth = 0.5 * (branch.theme_set().len().min(6) as f64 / 6.0)
        + 0.5 * (branch.theme_progression.len().min(4) as f64 / 4.0);

    let trajectory = &branch.trajectory;
    let emotional_resonance = 0.5 * flag(branch.mood_matches_ending())
        + 0.25 * flag(word_count(&trajectory.climax) >= 10)
        + 0.25 * flag(!trajectory.turning_points.is_empty());

    let coherence = [
        flag(!trajectory.summary.trim().is_empty()),
        trajectory.key_events.len().min(3) as f64 / 3.0,
        flag(!trajectory.turning_points.is_empty()),
        flag(!trajectory.climax.trim().is_empty()),
        flag(!trajectory.resolution.trim().is_empty()),
    ];
    let narrative_coherence = mean(&coherence).unwrap_or(0.0);

    let others: Vec<f64> = all
        .iter()
        .filter(|other| other.id != branch.id)
        .map(|other| similarity(comparisons, branch.id, other.id))
        .collect();
    let originality = 1.0 - mean(&others).unwrap_or(0.0);

    RankingCriteria {
        character_impact,
        thematic_depth,
        emotional_resonance,
        narrative_coherence,
        originality,
    }
}

// =============================================================================
// Consensus
// =============================================================================

/// Modal ending and mood (first seen wins a tie) and themes shared by at
/// least half of the branches.
pub fn consensus(branches: &[BranchVariation]) -> ConsensusSummary {
    let total = branches.len();
    if total == 0 {
        return ConsensusSummary {
            ending_type: None,
            mood: None,
            themes: Vec::new(),
            agreement_strength: 0.0,
        };
    }

    let ending = modal(branches.iter().map(|b| b.trajectory.ending_type));
    let mood = modal(branches.iter().map(|b| b.mood));

    let mut theme_counts: BTreeMap<String, usize> = BTreeMap::new();
    for branch in branches {
        for theme in branch.theme_set() {
            *theme_counts.entry(theme).or_default() += 1;
        }
    }
    let themes = theme_counts
        .into_iter()
        .filter(|(_, count)| count * 2 >= total)
        .map(|(theme, _)| theme)
        .collect();

    let share = |count: usize| count as f64 / total as f64;
    let agreement_strength = (ending.map_or(0.0, |(_, c)| share(c)) + mood.map_or(0.0, |(_, c)| share(c))) / 2.0;

    ConsensusSummary {
        ending_type: ending.map(|(e, _)| e),
        mood: mood.map(|(m, _)| m),
        themes,
        agreement_strength,
    }
}

/// Most frequent value with its count. Earlier values win ties.
fn modal<T: PartialEq + Copy>(values: impl Iterator<Item = T>) -> Option<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(T, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
}

// =============================================================================
// Clusters
// =============================================================================

/// Greedy single pass in input order: each unassigned branch seeds a cluster
/// and absorbs every unassigned branch more than `CLUSTER_THRESHOLD` similar
/// to it. Only clusters of two or more are returned.
pub fn cluster(branches: &[BranchVariation], comparisons: &ComparisonMap) -> Vec<SimilarityCluster> {
    let mut assigned = vec![false; branches.len()];
    let mut clusters = Vec::new();

    for (i, seed) in branches.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut members = vec![seed.id];
        let mut scores = Vec::new();
        for (j, other) in branches.iter().enumerate() {
            if assigned[j] {
                continue;
            }
            let score = similarity(comparisons, seed.id, other.id);
            if score > CLUSTER_THRESHOLD {
                assigned[j] = true;
                members.push(other.id);
                scores.push(score);
            }
        }
        if members.len() >= 2 {
            clusters.push(SimilarityCluster {
                members,
                average_similarity: mean(&scores).unwrap_or(0.0),
            });
        }
    }
    clusters
}

/// Branches with no pairwise similarity above `CLUSTER_THRESHOLD`.
pub fn unique_branches(branches: &[BranchVariation], comparisons: &ComparisonMap) -> Vec<BranchId> {
    branches
        .iter()
        .filter(|branch| {
            branches
                .iter()
                .filter(|other| other.id != branch.id)
                .all(|other| similarity(comparisons, branch.id, other.id) <= CLUSTER_THRESHOLD)
        })
        .map(|branch| branch.id)
        .collect()
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
    use branchwright_domain::{BranchMood, EndingType};

    #[test]
    fn test_modal_prefers_first_seen_on_tie() {
        assert_eq!(modal([2, 1, 1, 2].into_iter()), Some((2, 2)));
        assert_eq!(modal([3, 1, 1].into_iter()), Some((1, 2)));
        assert_eq!(modal(std::iter::empty::<u8>()), None);
    }

    #[test]
    fn when_two_of_three_branches_agree_then_consensus_follows_them() {
        let hopeful = test_fixtures::variation();
        let branches = vec![
            hopeful.clone(),
            test_fixtures::dark_variation(),
            hopeful.as_sibling(BranchId::new()),
        ];
        let summary = consensus(&branches);

        assert_eq!(summary.ending_type, Some(EndingType::Hopeful));
        assert_eq!(summary.mood, Some(BranchMood::Hopeful));
        assert!(summary.themes.contains(&"loyalty".to_string()));
        assert!(!summary.themes.contains(&"corruption".to_string()));
        assert!((summary.agreement_strength - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn when_half_the_branches_share_a_theme_then_it_counts() {
        let branches = vec![test_fixtures::variation(), test_fixtures::dark_variation()];
        let summary = consensus(&branches);
        assert!(summary.themes.contains(&"corruption".to_string()));
        assert!(summary.themes.contains(&"trust".to_string()));
    }
}
