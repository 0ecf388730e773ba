//! Refinement loop value objects: critiques, changes, iterations and results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::BranchVariation;

/// Area a refiner works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefinementArea {
    CharacterDepth,
    PlotCoherence,
    ThemeDevelopment,
    EmotionalImpact,
    DialogueQuality,
    Pacing,
    WorldBuilding,
    StakesClarity,
}

impl RefinementArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefinementArea::CharacterDepth => "character-depth",
            RefinementArea::PlotCoherence => "plot-coherence",
            RefinementArea::ThemeDevelopment => "theme-development",
            RefinementArea::EmotionalImpact => "emotional-impact",
            RefinementArea::DialogueQuality => "dialogue-quality",
            RefinementArea::Pacing => "pacing",
            RefinementArea::WorldBuilding => "world-building",
            RefinementArea::StakesClarity => "stakes-clarity",
        }
    }
}

impl fmt::Display for RefinementArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weakness found by the rule-based critique detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CritiqueKind {
    MissingArcs,
    ShallowArc,
    ThinPlot,
    MissingTurningPoints,
    MissingThemes,
    WeakClimax,
    UnclearStakes,
    PacingMismatch,
    ThinWorld,
}

impl CritiqueKind {
    /// Refinement area that addresses this weakness.
    pub fn area(&self) -> RefinementArea {
        match self {
            CritiqueKind::MissingArcs | CritiqueKind::ShallowArc => RefinementArea::CharacterDepth,
            CritiqueKind::ThinPlot | CritiqueKind::MissingTurningPoints => {
                RefinementArea::PlotCoherence
            }
            CritiqueKind::MissingThemes => RefinementArea::ThemeDevelopment,
            CritiqueKind::WeakClimax => RefinementArea::EmotionalImpact,
            CritiqueKind::UnclearStakes => RefinementArea::StakesClarity,
            CritiqueKind::PacingMismatch => RefinementArea::Pacing,
            CritiqueKind::ThinWorld => RefinementArea::WorldBuilding,
        }
    }
}

/// Ordering used when picking which critique to act on first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CritiquePriority {
    Minor,
    Moderate,
    Major,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Critique {
    pub kind: CritiqueKind,
    pub area: RefinementArea,
    pub priority: CritiquePriority,
    pub message: String,
}

/// Record of one field rewritten by a refiner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementChange {
    pub area: RefinementArea,
    /// Human-readable field path, e.g. `trajectory.climax`
    pub field: String,
    pub before: String,
    pub after: String,
    /// The critique or instruction that prompted the change
    pub reason: String,
}

/// One completed iteration of the refinement loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementIteration {
    /// 1-based
    pub number: u32,
    pub critiques: Vec<Critique>,
    pub addressed: Vec<CritiqueKind>,
    pub changes: Vec<RefinementChange>,
    pub quality_score: f64,
    /// Difference to the previous iteration's score; `None` for the first
    pub improvement: Option<f64>,
    pub variation: BranchVariation,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoppedReason {
    UserSatisfied,
    MaxIterations,
    DiminishingReturns,
    Cancelled,
    RefinerFailed,
}

impl fmt::Display for StoppedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoppedReason::UserSatisfied => "user-satisfied",
            StoppedReason::MaxIterations => "max-iterations",
            StoppedReason::DiminishingReturns => "diminishing-returns",
            StoppedReason::Cancelled => "cancelled",
            StoppedReason::RefinerFailed => "refiner-failed",
        };
        f.write_str(s)
    }
}

/// Loop configuration for a single refinement request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOptions {
    pub max_iterations: u32,
    pub stop_on_diminishing_returns: bool,
    pub min_improvement_threshold: f64,
    pub satisfaction_threshold: f64,
    pub max_changes_per_iteration: usize,
}

impl RefinementOptions {
    pub const MIN_ITERATIONS: u32 = 1;
    pub const MAX_ITERATIONS: u32 = 5;

    /// Iteration cap clamped to `1..=5`.
    pub fn iteration_cap(&self) -> u32 {
        self.max_iterations
            .clamp(Self::MIN_ITERATIONS, Self::MAX_ITERATIONS)
    }
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            stop_on_diminishing_returns: true,
            min_improvement_threshold: 0.05,
            satisfaction_threshold: 0.8,
            max_changes_per_iteration: 3,
        }
    }
}

/// Final state handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefinementResult {
    /// Last fully completed variation
    pub variation: BranchVariation,
    pub iterations: Vec<RefinementIteration>,
    pub stopped_reason: StoppedReason,
    pub final_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_cap_is_clamped() {
        let mut options = RefinementOptions::default();
        options.max_iterations = 0;
        assert_eq!(options.iteration_cap(), 1);
        options.max_iterations = 12;
        assert_eq!(options.iteration_cap(), 5);
    }

    #[test]
    fn test_priority_orders_major_first_when_reversed() {
        let mut priorities = vec![
            CritiquePriority::Minor,
            CritiquePriority::Major,
            CritiquePriority::Moderate,
        ];
        priorities.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities[0], CritiquePriority::Major);
    }

    #[test]
    fn test_stopped_reason_serializes_kebab() {
        let json = serde_json::to_string(&StoppedReason::DiminishingReturns).unwrap();
        assert_eq!(json, "\"diminishing-returns\"");
    }

    #[test]
    fn test_scores_survive_json_exactly() {
        // Resumed sessions compare improvements against stored scores
        let scores = vec![0.1 + 0.2, 0.9600000000000001, 1.0 / 3.0, 0.7 * 0.35];
        let json = serde_json::to_string(&scores).unwrap();
        let parsed: Vec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scores);
    }
}
