//! # Branchwright Domain
//!
//! Pure data and invariants for story-branch generation, validation,
//! refinement and comparison. No I/O, no async, no randomness: the engine
//! crate injects all of that through ports.

extern crate self as branchwright_domain;

pub mod aggregates;
pub mod common;
pub mod error;
pub mod events;
pub mod ids;
pub mod types;
pub mod value_objects;

pub use error::DomainError;

pub use ids::{
    AlternativeId, AnchorId, BranchId, CharacterId, IssueId, MessageId, PremiseId, WorldRuleId,
};

pub use aggregates::{
    BlockingIssue, BlockingSource, BranchRecord, BranchRecordPatch, BranchStatus,
    ConversationMessage, FixIssue, FixPatch, FixType, FixWorkflow, Instruction, IssueSource,
    IssueStatus, MessageKind, PatchTarget, RefinementConversation, WorkflowStatus,
};

pub use events::BranchRecordUpdate;

pub use types::{
    BranchMood, Complexity, ConsequenceScope, EndingType, GrowthType, Importance, NarrativeType,
    Severity, Significance, StrictnessLevel, TraitKind, TraitTier,
};

pub use value_objects::{
    AlternativeOutcome, AnchorDetails, BranchComparison, BranchPremise, BranchRanking,
    BranchSettings, BranchTrajectory, BranchVariation, CharacterArcProjection,
    CharacterDeviationRules, CharacterFateComparison, CharacterProfile, ComparisonDimension,
    ConsensusSummary, ContextPackage, Critique, CritiqueKind, CritiquePriority, DeviationConfig,
    DeviationDecision, DeviationOutcome, DeviationOverrides, DimensionSimilarity,
    DimensionValidation, FateDivergence, FullValidationResult, HardRuleCategory, MoralAlignment,
    MultiBranchComparison, PacingStyle, PairKey, RankingCriteria, RefinementArea,
    RefinementChange, RefinementIteration, RefinementOptions, RefinementResult, RuleKind,
    RuleViolation, SimilarityCluster, SoftRuleCategory, SoftRuleOutcome, StoppedReason,
    StyleProfile, TierViolations, TieredValidationResult, ToneRegister, TraitAssessment,
    TraitViolation, ValidationDimension, WorldRule, WorldRulesValidation, WorldState,
};
