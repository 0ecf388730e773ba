//! Deviation controller: turns tiered trait results into decisions.

use std::collections::BTreeSet;

use branchwright_domain::{
    DeviationConfig, DeviationDecision, DeviationOutcome, StrictnessLevel, TieredValidationResult,
    TraitKind, TraitTier,
};

/// Effective permissions after applying level defaults and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Permissions {
    allow_core: bool,
    allow_secondary: bool,
    require_justification: bool,
}

impl Permissions {
    fn for_level(level: StrictnessLevel) -> Self {
        let (allow_core, allow_secondary, require_justification) = match level {
            StrictnessLevel::Strict => (false, false, true),
            StrictnessLevel::Moderate => (false, true, true),
            StrictnessLevel::Flexible => (true, true, true),
            StrictnessLevel::Creative => (true, true, false),
        };
        Self {
            allow_core,
            allow_secondary,
            require_justification,
        }
    }

    fn resolve(config: &DeviationConfig) -> Self {
        let base = Self::for_level(config.level);
        let overrides = &config.overrides;
        Self {
            allow_core: overrides.allow_core_changes.unwrap_or(base.allow_core),
            allow_secondary: overrides
                .allow_secondary_changes
                .unwrap_or(base.allow_secondary),
            require_justification: overrides
                .require_justification
                .unwrap_or(base.require_justification),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeviationController;

impl DeviationController {
    pub fn new() -> Self {
        Self
    }

    /// Decide one character's result under `config`.
    ///
    /// Protected traits veto everything; whitelisted traits are permitted and
    /// need no justification; overrides replace the level's defaults.
    pub fn decide(
        &self,
        result: &TieredValidationResult,
        config: &DeviationConfig,
    ) -> DeviationDecision {
        let permissions = Permissions::resolve(config);
        let rules = config.rules_for(result.character_id);
        let protected = |kind: TraitKind| rules.is_some_and(|r| r.protected_traits.contains(&kind));
        let whitelisted =
            |kind: TraitKind| rules.is_some_and(|r| r.allowed_deviations.contains(&kind));

        let violated: BTreeSet<TraitKind> = result.violations.iter().map(|v| v.kind).collect();
        let in_tier = |tier: TraitTier| -> Vec<TraitKind> {
            violated
                .iter()
                .copied()
                .filter(|k| k.tier() == tier && !whitelisted(*k))
                .collect()
        };

        let protected_hits: Vec<TraitKind> =
            violated.iter().copied().filter(|k| protected(*k)).collect();
        let core = in_tier(TraitTier::Core);
        let secondary = in_tier(TraitTier::Secondary);

        let outcome = if !protected_hits.is_empty() {
            DeviationOutcome::Rejected {
                reason: format!(
                    "{} changes protected traits: {}",
                    result.character_name,
                    names(&protected_hits)
                ),
                traits: protected_hits,
            }
        } else if !core.is_empty() && !permissions.allow_core {
            DeviationOutcome::Rejected {
                reason: format!(
                    "Core traits may not change under {} policy: {}",
                    config.level,
                    names(&core)
                ),
                traits: core,
            }
        } else if !secondary.is_empty() && !permissions.allow_secondary {
            DeviationOutcome::NeedsJustification {
                reason: format!(
                    "Secondary traits changed beyond {} policy: {}",
                    config.level,
                    names(&secondary)
                ),
                traits: core.into_iter().chain(secondary).collect(),
            }
        } else if (!core.is_empty() || !secondary.is_empty()) && permissions.require_justification
        {
            let traits: Vec<TraitKind> = core.into_iter().chain(secondary).collect();
            DeviationOutcome::NeedsJustification {
                reason: format!("Justify the change to {}", names(&traits)),
                traits,
            }
        } else {
            let warnings: Vec<TraitKind> = violated.iter().copied().collect();
            DeviationOutcome::Accepted { warnings }
        };

        if outcome.is_rejected() {
            tracing::info!(
                branch_id = %result.branch_id,
                character = %result.character_name,
                traits = %names(outcome.traits()),
                "Deviation rejected"
            );
        }

        DeviationDecision {
            branch_id: result.branch_id,
            character_id: result.character_id,
            character_name: result.character_name.clone(),
            outcome,
        }
    }

    /// Decide every result of a branch.
    pub fn decide_all(
        &self,
        results: &[TieredValidationResult],
        config: &DeviationConfig,
    ) -> Vec<DeviationDecision> {
        results.iter().map(|r| self.decide(r, config)).collect()
    }
}

fn names(traits: &[TraitKind]) -> String {
    traits
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
