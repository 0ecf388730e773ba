//! Multi-dimensional validation results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BranchId;

/// The eight narrative-quality dimensions every branch is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationDimension {
    CharacterConsistency,
    WorldConsistency,
    PlotPlausibility,
    ThematicCoherence,
    ToneConsistency,
    PacingBalance,
    StakesClarity,
    NarrativeSatisfaction,
}

impl ValidationDimension {
    pub const ALL: [ValidationDimension; 8] = [
        ValidationDimension::CharacterConsistency,
        ValidationDimension::WorldConsistency,
        ValidationDimension::PlotPlausibility,
        ValidationDimension::ThematicCoherence,
        ValidationDimension::ToneConsistency,
        ValidationDimension::PacingBalance,
        ValidationDimension::StakesClarity,
        ValidationDimension::NarrativeSatisfaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationDimension::CharacterConsistency => "character-consistency",
            ValidationDimension::WorldConsistency => "world-consistency",
            ValidationDimension::PlotPlausibility => "plot-plausibility",
            ValidationDimension::ThematicCoherence => "thematic-coherence",
            ValidationDimension::ToneConsistency => "tone-consistency",
            ValidationDimension::PacingBalance => "pacing-balance",
            ValidationDimension::StakesClarity => "stakes-clarity",
            ValidationDimension::NarrativeSatisfaction => "narrative-satisfaction",
        }
    }
}

impl fmt::Display for ValidationDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and findings for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValidation {
    pub dimension: ValidationDimension,
    /// In `[0, 1]`
    pub score: f64,
    pub passed: bool,
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
}

impl DimensionValidation {
    /// Minimum score for a dimension to pass.
    pub const PASS_THRESHOLD: f64 = 0.5;
    /// Below this a dimension is a critical failure.
    pub const CRITICAL_THRESHOLD: f64 = 0.4;
    /// Below this a dimension contributes a recommendation.
    pub const RECOMMENDATION_THRESHOLD: f64 = 0.7;

    pub fn is_critical_failure(&self) -> bool {
        self.score < Self::CRITICAL_THRESHOLD
    }
}

/// Aggregate result over all eight dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FullValidationResult {
    pub branch_id: BranchId,
    /// One entry per dimension, in `ValidationDimension::ALL` order
    pub dimensions: Vec<DimensionValidation>,
    /// Unweighted mean of the dimension scores
    pub overall_score: f64,
    pub passed: bool,
    pub critical_failures: Vec<ValidationDimension>,
    pub recommendations: Vec<String>,
}

impl FullValidationResult {
    pub fn dimension(&self, dimension: ValidationDimension) -> Option<&DimensionValidation> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }
}
