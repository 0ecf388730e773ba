//! Tiered trait validation.
//!
//! Each established trait of a character is checked against the arc the
//! branch projects for them. A trait is lost when:
//! - a sentence about the character pairs a reversal verb with the trait's
//!   wording ("Mara abandons her loyalty")
//! - moral alignment runs against the arc's growth (a good character on a
//!   negative arc, an evil one on a positive arc)
//! - personality reverses an established growth direction
//!
//! The score is the preserved tier weight over the total tier weight of the
//! traits the character actually has.

mod deviation;

pub use deviation::DeviationController;

use branchwright_domain::common::{clamp_score, sentences, tokenize};
use branchwright_domain::{
    BranchVariation, CharacterArcProjection, CharacterProfile, ContextPackage, GrowthType,
    MoralAlignment, TierViolations, TieredValidationResult, TraitAssessment, TraitKind,
    TraitViolation,
};

/// Word stems that mark a character turning away from something.
const REVERSAL_STEMS: &[&str] = &[
    "abandon", "betray", "renounc", "reject", "forsak", "forsook", "disown", "repudiat",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct TieredTraitValidator;

impl TieredTraitValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every involved character of `context` against `variation`.
    pub fn validate_all(
        &self,
        context: &ContextPackage,
        variation: &BranchVariation,
    ) -> Vec<TieredValidationResult> {
        context
            .involved_characters()
            .into_iter()
            .map(|character| self.validate_tiered_traits(character, variation))
            .collect()
    }

    /// Score how well `variation` preserves one character's traits.
    ///
    /// A character the branch projects no arc for keeps every trait.
    pub fn validate_tiered_traits(
        &self,
        character: &CharacterProfile,
        variation: &BranchVariation,
    ) -> TieredValidationResult {
        let arc = variation.arc_for(character.id);
        let statements = arc
            .map(|arc| statements_about(character, arc, variation))
            .unwrap_or_default();

        let mut traits = Vec::new();
        let mut violations = TierViolations::default();

        for kind in TraitKind::all() {
            let Some(established) = established_value(character, *kind) else {
                continue;
            };
            let broken = arc.and_then(|arc| {
                check_trait(character, *kind, &established, arc, &statements)
            });
            if let Some(reason) = &broken {
                violations.push(TraitViolation {
                    character_id: character.id,
                    character_name: character.name.clone(),
                    kind: *kind,
                    tier: kind.tier(),
                    reason: reason.clone(),
                });
            }
            traits.push(TraitAssessment {
                kind: *kind,
                tier: kind.tier(),
                preserved: broken.is_none(),
                established,
            });
        }

        let total: f64 = traits.iter().map(|t| t.tier.weight()).sum();
        let preserved: f64 = traits
            .iter()
            .filter(|t| t.preserved)
            .map(|t| t.tier.weight())
            .sum();
        let overall_score = if total > 0.0 {
            clamp_score(preserved / total)
        } else {
            1.0
        };

        if !violations.is_empty() {
            tracing::debug!(
                branch_id = %variation.id,
                character = %character.name,
                core = violations.core.len(),
                secondary = violations.secondary.len(),
                minor = violations.minor.len(),
                overall_score,
                "Trait violations found"
            );
        }

        TieredValidationResult {
            branch_id: variation.id,
            character_id: character.id,
            character_name: character.name.clone(),
            overall_score,
            traits,
            violations,
        }
    }
}

/// The character's established value for a trait, `None` when untracked.
fn established_value(character: &CharacterProfile, kind: TraitKind) -> Option<String> {
    let joined = |items: &[String]| {
        let parts: Vec<&str> = items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    };
    match kind {
        TraitKind::Values => joined(&character.values),
        TraitKind::PrimaryMotivation => character
            .motivation
            .as_ref()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        TraitKind::MoralAlignment => Some(
            match character.alignment {
                MoralAlignment::Good => "good",
                MoralAlignment::Neutral => "neutral",
                MoralAlignment::Evil => "evil",
            }
            .to_string(),
        ),
        TraitKind::PersonalityTraits => joined(&character.personality),
        TraitKind::Skills => joined(&character.skills),
        TraitKind::Relationships => joined(&character.relationships),
        TraitKind::Goals => joined(&character.goals),
        TraitKind::Preferences => joined(&character.preferences),
        TraitKind::Habits => joined(&character.habits),
        TraitKind::SurfaceBehavior => joined(&character.surface_behaviors),
    }
}

/// Sentences that speak about the character: their arc, plus any premise or
/// trajectory sentence naming them.
fn statements_about(
    character: &CharacterProfile,
    arc: &CharacterArcProjection,
    variation: &BranchVariation,
) -> Vec<String> {
    let name = character.name.to_lowercase();
    let arc_text = arc.text();
    let story_text = format!("{}. {}", variation.premise.text(), variation.trajectory.text());

    sentences(&arc_text)
        .map(str::to_string)
        .chain(
            sentences(&story_text)
                .filter(|s| !name.is_empty() && s.to_lowercase().contains(&name))
                .map(str::to_string),
        )
        .collect()
}

fn check_trait(
    character: &CharacterProfile,
    kind: TraitKind,
    established: &str,
    arc: &CharacterArcProjection,
    statements: &[String],
) -> Option<String> {
    match kind {
        TraitKind::MoralAlignment => match (character.alignment, arc.growth) {
            (MoralAlignment::Good, GrowthType::Negative) => Some(format!(
                "{} is established as good but follows a negative arc",
                character.name
            )),
            (MoralAlignment::Evil, GrowthType::Positive) => Some(format!(
                "{} is established as evil but follows a positive arc",
                character.name
            )),
            _ => None,
        },
        TraitKind::PersonalityTraits => {
            let reversed = character
                .established_growth
                .filter(|established| established.reverses(&arc.growth))
                .map(|established| {
                    format!(
                        "{}'s {} arc reverses their established {} growth",
                        character.name,
                        arc.growth.as_str(),
                        established.as_str()
                    )
                });
            reversed.or_else(|| find_reversal(character, established, statements))
        }
        _ => find_reversal(character, established, statements),
    }
}

/// A statement pairing a reversal verb with any word of the established value.
fn find_reversal(
    character: &CharacterProfile,
    established: &str,
    statements: &[String],
) -> Option<String> {
    let trait_words = tokenize(established);
    if trait_words.is_empty() {
        return None;
    }
    statements.iter().find_map(|statement| {
        let words = tokenize(statement);
        let reverses = words
            .iter()
            .any(|w| REVERSAL_STEMS.iter().any(|stem| w.starts_with(stem)));
        let touches = !words.is_disjoint(&trait_words);
        (reverses && touches).then(|| {
            format!(
                "{} turns from '{}': \"{}\"",
                character.name, established, statement
            )
        })
    })
}
