//! World rules and the reports produced when a branch is checked against them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Importance, Severity};
use crate::{BranchId, WorldRuleId};

/// Immutable constraints of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardRuleCategory {
    Physics,
    Causality,
    EstablishedPowers,
    PastEventPermanence,
    CharacterIdentity,
}

impl HardRuleCategory {
    pub fn all() -> &'static [HardRuleCategory] {
        &[
            HardRuleCategory::Physics,
            HardRuleCategory::Causality,
            HardRuleCategory::EstablishedPowers,
            HardRuleCategory::PastEventPermanence,
            HardRuleCategory::CharacterIdentity,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HardRuleCategory::Physics => "physics",
            HardRuleCategory::Causality => "causality",
            HardRuleCategory::EstablishedPowers => "established-powers",
            HardRuleCategory::PastEventPermanence => "past-event-permanence",
            HardRuleCategory::CharacterIdentity => "character-identity",
        }
    }
}

/// Bendable conventions of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoftRuleCategory {
    SocialNorms,
    PoliticalStructure,
    CulturalTradition,
    EconomicSystems,
    UnwrittenRules,
}

impl SoftRuleCategory {
    pub fn all() -> &'static [SoftRuleCategory] {
        &[
            SoftRuleCategory::SocialNorms,
            SoftRuleCategory::PoliticalStructure,
            SoftRuleCategory::CulturalTradition,
            SoftRuleCategory::EconomicSystems,
            SoftRuleCategory::UnwrittenRules,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoftRuleCategory::SocialNorms => "social-norms",
            SoftRuleCategory::PoliticalStructure => "political-structure",
            SoftRuleCategory::CulturalTradition => "cultural-tradition",
            SoftRuleCategory::EconomicSystems => "economic-systems",
            SoftRuleCategory::UnwrittenRules => "unwritten-rules",
        }
    }
}

/// Whether a rule may never be broken or may be bent with justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "kebab-case")]
pub enum RuleKind {
    Hard(HardRuleCategory),
    Soft(SoftRuleCategory),
}

impl RuleKind {
    pub fn is_hard(&self) -> bool {
        matches!(self, RuleKind::Hard(_))
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Hard(c) => write!(f, "hard:{}", c.as_str()),
            RuleKind::Soft(c) => write!(f, "soft:{}", c.as_str()),
        }
    }
}

/// One rule of the world, as established by the source work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldRule {
    pub id: WorldRuleId,
    pub kind: RuleKind,
    pub importance: Importance,
    pub description: String,
    /// Case-insensitive patterns whose presence in branch text breaks the rule
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Whether a soft rule was bent with justification or broken outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoftRuleOutcome {
    Bent,
    Broken,
}

/// A single rule violation found in a branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    /// `None` for violations found by the built-in category detectors
    pub rule_id: Option<WorldRuleId>,
    pub kind: RuleKind,
    pub severity: Severity,
    pub description: String,
    /// The branch text that triggered the violation
    pub evidence: String,
    /// Soft rules only
    pub soft_outcome: Option<SoftRuleOutcome>,
    /// Hard violations accepted upstream; reported but not blocking
    #[serde(default)]
    pub overridden: bool,
}

impl RuleViolation {
    pub fn blocks_acceptance(&self) -> bool {
        self.kind.is_hard() && !self.overridden
    }
}

/// World-rule report for one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorldRulesValidation {
    pub branch_id: BranchId,
    pub hard_violations: Vec<RuleViolation>,
    pub soft_violations: Vec<RuleViolation>,
    pub soft_bent: usize,
    pub soft_broken: usize,
    /// False while any non-overridden hard violation remains
    pub acceptable: bool,
}

impl WorldRulesValidation {
    pub fn new(
        branch_id: BranchId,
        hard_violations: Vec<RuleViolation>,
        soft_violations: Vec<RuleViolation>,
    ) -> Self {
        let soft_bent = soft_violations
            .iter()
            .filter(|v| v.soft_outcome == Some(SoftRuleOutcome::Bent))
            .count();
        let soft_broken = soft_violations.len() - soft_bent;
        let acceptable = !hard_violations.iter().any(RuleViolation::blocks_acceptance);
        Self {
            branch_id,
            hard_violations,
            soft_violations,
            soft_bent,
            soft_broken,
            acceptable,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.hard_violations.is_empty() && self.soft_violations.is_empty()
    }
}
