//! Multi-branch comparison results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BranchMood, EndingType};
use crate::value_objects::BranchVariation;
use crate::{BranchId, CharacterId};

/// Canonical key for an unordered pair of branches: `min-max` with the ids
/// ordered lexically, so `(a, b)` and `(b, a)` map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(a: BranchId, b: BranchId) -> Self {
        let (a, b) = (a.to_string(), b.to_string());
        if a <= b {
            Self(format!("{}-{}", a, b))
        } else {
            Self(format!("{}-{}", b, a))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The eight comparison dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonDimension {
    PremiseSimilarity,
    CharacterFateOverlap,
    ThemeAlignment,
    EndingContrast,
    EmotionalArcMatch,
    ConsequenceScopeMatch,
    StructuralSimilarity,
    ReaderExperienceMatch,
}

impl ComparisonDimension {
    pub const ALL: [ComparisonDimension; 8] = [
        ComparisonDimension::PremiseSimilarity,
        ComparisonDimension::CharacterFateOverlap,
        ComparisonDimension::ThemeAlignment,
        ComparisonDimension::EndingContrast,
        ComparisonDimension::EmotionalArcMatch,
        ComparisonDimension::ConsequenceScopeMatch,
        ComparisonDimension::StructuralSimilarity,
        ComparisonDimension::ReaderExperienceMatch,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSimilarity {
    pub dimension: ComparisonDimension,
    pub similarity: f64,
}

/// How far apart two branches take a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FateDivergence {
    Same,
    Similar,
    Different,
    /// The character has an arc in only one of the two branches
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterFateComparison {
    pub character_id: CharacterId,
    pub character_name: String,
    pub similarity: f64,
    pub divergence: FateDivergence,
}

/// Pairwise comparison of two branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchComparison {
    pub branch_a: BranchId,
    pub branch_b: BranchId,
    pub dimensions: Vec<DimensionSimilarity>,
    pub character_fates: Vec<CharacterFateComparison>,
    /// Unweighted mean of the dimension similarities
    pub overall_similarity: f64,
    pub key_differences: Vec<String>,
    pub shared_elements: Vec<String>,
}

impl BranchComparison {
    pub fn similarity(&self, dimension: ComparisonDimension) -> Option<f64> {
        self.dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| d.similarity)
    }
}

/// Per-criterion scores behind a ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingCriteria {
    pub character_impact: f64,
    pub thematic_depth: f64,
    pub emotional_resonance: f64,
    pub narrative_coherence: f64,
    pub originality: f64,
}

impl RankingCriteria {
    pub fn mean(&self) -> f64 {
        (self.character_impact
            + self.thematic_depth
            + self.emotional_resonance
            + self.narrative_coherence
            + self.originality)
            / 5.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchRanking {
    pub branch_id: BranchId,
    /// 1-based, unique within a comparison
    pub rank: usize,
    pub score: f64,
    pub criteria: RankingCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusSummary {
    pub ending_type: Option<EndingType>,
    pub mood: Option<BranchMood>,
    /// Themes present in at least half of the branches
    pub themes: Vec<String>,
    /// Mean share of branches agreeing with the modal ending and mood
    pub agreement_strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityCluster {
    /// First member seeded the cluster
    pub members: Vec<BranchId>,
    pub average_similarity: f64,
}

/// Result of one comparison request. Rebuilt from scratch when the set changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiBranchComparison {
    pub branches: Vec<BranchVariation>,
    pub comparisons: BTreeMap<PairKey, BranchComparison>,
    /// character id → branch id → ending state
    pub character_fates: BTreeMap<CharacterId, BTreeMap<BranchId, String>>,
    pub rankings: Vec<BranchRanking>,
    pub consensus: ConsensusSummary,
    pub unique_branches: Vec<BranchId>,
    pub clusters: Vec<SimilarityCluster>,
}

impl MultiBranchComparison {
    pub fn comparison(&self, a: BranchId, b: BranchId) -> Option<&BranchComparison> {
        self.comparisons.get(&PairKey::new(a, b))
    }
}
