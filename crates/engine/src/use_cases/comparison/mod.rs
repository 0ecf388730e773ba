//! Multi-branch comparison.
//!
//! Pairs are compared in parallel; rankings, consensus and clusters are then
//! reduced from the complete pairwise map. Input branches are never modified.

mod ranking;
mod similarity;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use branchwright_domain::{
    BranchComparison, BranchId, BranchVariation, MultiBranchComparison, PairKey,
};

pub use ranking::{cluster, consensus, rank_branches, unique_branches, CLUSTER_THRESHOLD};
pub use similarity::character_fates;

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("At least 2 branches are required for comparison, got {0}")]
    TooFewBranches(usize),
    #[error("Branch {0} appears more than once")]
    DuplicateBranch(BranchId),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BranchComparator;

impl BranchComparator {
    pub fn new() -> Self {
        Self
    }

    /// Compare two branches on all eight dimensions.
    pub fn compare_branches(&self, a: &BranchVariation, b: &BranchVariation) -> BranchComparison {
        similarity::compare_pair(a, b)
    }

    /// Compare every unordered pair and reduce to rankings, consensus and
    /// clusters.
    pub fn compare(
        &self,
        branches: &[BranchVariation],
    ) -> Result<MultiBranchComparison, ComparisonError> {
        if branches.len() < 2 {
            return Err(ComparisonError::TooFewBranches(branches.len()));
        }
        let mut seen = BTreeSet::new();
        for branch in branches {
            if !seen.insert(branch.id) {
                return Err(ComparisonError::DuplicateBranch(branch.id));
            }
        }

        let pairs: Vec<(usize, usize)> = (0..branches.len())
            .flat_map(|i| (i + 1..branches.len()).map(move |j| (i, j)))
            .collect();
        let comparisons: BTreeMap<PairKey, BranchComparison> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let (a, b) = (&branches[i], &branches[j]);
                (PairKey::new(a.id, b.id), similarity::compare_pair(a, b))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        let mut fates: BTreeMap<_, BTreeMap<BranchId, String>> = BTreeMap::new();
        for branch in branches {
            for arc in &branch.character_arcs {
                fates
                    .entry(arc.character_id)
                    .or_default()
                    .insert(branch.id, arc.ending_state.clone());
            }
        }

        let rankings = rank_branches(branches, &comparisons);
        let consensus = consensus(branches);
        let clusters = cluster(branches, &comparisons);
        let unique = unique_branches(branches, &comparisons);

        tracing::info!(
            branches = branches.len(),
            pairs = comparisons.len(),
            clusters = clusters.len(),
            unique = unique.len(),
            "Compared branches"
        );

        Ok(MultiBranchComparison {
            branches: branches.to_vec(),
            comparisons,
            character_fates: fates,
            rankings,
            consensus,
            unique_branches: unique,
            clusters,
        })
    }
}
