//! Value objects - Immutable objects defined by their attributes

mod branch;
mod comparison;
mod context;
mod refinement;
mod settings;
mod traits;
mod validation;
mod world_rules;

pub use branch::{BranchPremise, BranchTrajectory, BranchVariation, CharacterArcProjection};
pub use comparison::{
    BranchComparison, BranchRanking, CharacterFateComparison, ComparisonDimension,
    ConsensusSummary, DimensionSimilarity, FateDivergence, MultiBranchComparison, PairKey,
    RankingCriteria, SimilarityCluster,
};
pub use context::{
    AlternativeOutcome, AnchorDetails, CharacterProfile, ContextPackage, MoralAlignment,
    PacingStyle, StyleProfile, ToneRegister, WorldState,
};
pub use refinement::{
    Critique, CritiqueKind, CritiquePriority, RefinementArea, RefinementChange,
    RefinementIteration, RefinementOptions, RefinementResult, StoppedReason,
};
pub use settings::BranchSettings;
pub use traits::{
    CharacterDeviationRules, DeviationConfig, DeviationDecision, DeviationOutcome,
    DeviationOverrides, TierViolations, TieredValidationResult, TraitAssessment, TraitViolation,
};
pub use validation::{DimensionValidation, FullValidationResult, ValidationDimension};
pub use world_rules::{
    HardRuleCategory, RuleKind, RuleViolation, SoftRuleCategory, SoftRuleOutcome, WorldRule,
    WorldRulesValidation,
};
