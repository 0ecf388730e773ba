//! Tiered trait validation results and deviation policy.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{StrictnessLevel, TraitKind, TraitTier};
use crate::{BranchId, CharacterId};

/// One tracked trait and whether the branch preserves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraitAssessment {
    pub kind: TraitKind,
    pub tier: TraitTier,
    pub preserved: bool,
    /// Established value of the trait, e.g. "honour, loyalty"
    pub established: String,
}

/// A trait the branch fails to preserve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraitViolation {
    pub character_id: CharacterId,
    pub character_name: String,
    pub kind: TraitKind,
    pub tier: TraitTier,
    pub reason: String,
}

/// Violations bucketed by tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TierViolations {
    pub core: Vec<TraitViolation>,
    pub secondary: Vec<TraitViolation>,
    pub minor: Vec<TraitViolation>,
}

impl TierViolations {
    pub fn push(&mut self, violation: TraitViolation) {
        match violation.tier {
            TraitTier::Core => self.core.push(violation),
            TraitTier::Secondary => self.secondary.push(violation),
            TraitTier::Minor => self.minor.push(violation),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitViolation> {
        self.core
            .iter()
            .chain(self.secondary.iter())
            .chain(self.minor.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty() && self.secondary.is_empty() && self.minor.is_empty()
    }
}

/// Trait-preservation result for one character in one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TieredValidationResult {
    pub branch_id: BranchId,
    pub character_id: CharacterId,
    pub character_name: String,
    /// Preserved tier weight over total tier weight, in `[0, 1]`
    pub overall_score: f64,
    pub traits: Vec<TraitAssessment>,
    pub violations: TierViolations,
}

/// Explicit per-tier overrides. `None` defers to the strictness level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviationOverrides {
    #[serde(default)]
    pub allow_core_changes: Option<bool>,
    #[serde(default)]
    pub allow_secondary_changes: Option<bool>,
    #[serde(default)]
    pub require_justification: Option<bool>,
}

/// Per-character exceptions to the base policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDeviationRules {
    /// Traits that may change even when the base level forbids it
    #[serde(default)]
    pub allowed_deviations: BTreeSet<TraitKind>,
    /// Traits that may never change, whatever the level or overrides say
    #[serde(default)]
    pub protected_traits: BTreeSet<TraitKind>,
}

/// Deviation policy supplied by user settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviationConfig {
    #[serde(default)]
    pub level: StrictnessLevel,
    #[serde(default)]
    pub overrides: DeviationOverrides,
    #[serde(default)]
    pub characters: HashMap<CharacterId, CharacterDeviationRules>,
}

impl DeviationConfig {
    pub fn with_level(level: StrictnessLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Builder-style helper to protect a trait for a character.
    pub fn protect(mut self, character_id: CharacterId, kind: TraitKind) -> Self {
        self.characters
            .entry(character_id)
            .or_default()
            .protected_traits
            .insert(kind);
        self
    }

    /// Builder-style helper to whitelist a trait change for a character.
    pub fn allow(mut self, character_id: CharacterId, kind: TraitKind) -> Self {
        self.characters
            .entry(character_id)
            .or_default()
            .allowed_deviations
            .insert(kind);
        self
    }

    pub fn rules_for(&self, character_id: CharacterId) -> Option<&CharacterDeviationRules> {
        self.characters.get(&character_id)
    }
}

/// Outcome of applying a `DeviationConfig` to one character's result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DeviationOutcome {
    Accepted {
        /// Minor drift reported but not blocking
        warnings: Vec<TraitKind>,
    },
    NeedsJustification {
        traits: Vec<TraitKind>,
        reason: String,
    },
    Rejected {
        traits: Vec<TraitKind>,
        reason: String,
    },
}

impl DeviationOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, DeviationOutcome::Rejected { .. })
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, DeviationOutcome::Accepted { .. })
    }

    /// Offending trait names, including warnings.
    pub fn traits(&self) -> &[TraitKind] {
        match self {
            DeviationOutcome::Accepted { warnings } => warnings,
            DeviationOutcome::NeedsJustification { traits, .. } => traits,
            DeviationOutcome::Rejected { traits, .. } => traits,
        }
    }
}

/// Deviation decision for one character in one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviationDecision {
    pub branch_id: BranchId,
    pub character_id: CharacterId,
    pub character_name: String,
    pub outcome: DeviationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(kind: TraitKind) -> TraitViolation {
        TraitViolation {
            character_id: CharacterId::new(),
            character_name: "Mara".into(),
            kind,
            tier: kind.tier(),
            reason: "reversed".into(),
        }
    }

    #[test]
    fn test_violations_bucket_by_tier() {
        let mut buckets = TierViolations::default();
        buckets.push(violation(TraitKind::MoralAlignment));
        buckets.push(violation(TraitKind::Skills));
        buckets.push(violation(TraitKind::Habits));
        assert_eq!(buckets.core.len(), 1);
        assert_eq!(buckets.secondary.len(), 1);
        assert_eq!(buckets.minor.len(), 1);
        assert_eq!(buckets.iter().count(), 3);
    }

    #[test]
    fn test_config_builders_merge_per_character() {
        let id = CharacterId::new();
        let config = DeviationConfig::with_level(StrictnessLevel::Creative)
            .protect(id, TraitKind::MoralAlignment)
            .allow(id, TraitKind::Values);
        let rules = config.rules_for(id).unwrap();
        assert!(rules.protected_traits.contains(&TraitKind::MoralAlignment));
        assert!(rules.allowed_deviations.contains(&TraitKind::Values));
    }

    #[test]
    fn test_config_deserializes_protected_traits() {
        let id = CharacterId::new();
        let json = format!(
            r#"{{"level":"creative","characters":{{"{}":{{"protectedTraits":["moral-alignment"]}}}}}}"#,
            id
        );
        let config: DeviationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.level, StrictnessLevel::Creative);
        assert!(config
            .rules_for(id)
            .unwrap()
            .protected_traits
            .contains(&TraitKind::MoralAlignment));
    }
}
