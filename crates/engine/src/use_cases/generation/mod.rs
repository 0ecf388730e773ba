//! Variation generation use case.
//!
//! Produces a bounded set of structurally distinct `BranchVariation`
//! candidates from a `ContextPackage`:
//! - The anchor's significance caps the candidate count (2/3/4/5)
//! - Candidate `i` takes the `i`-th consequence scope and mood of the fixed
//!   rotations, so successive candidates differ
//! - Endings and arc growth follow the mood; only phrasing is random, and it
//!   comes from the injected `RandomPort`

mod templates;

use std::collections::BTreeSet;
use std::sync::Arc;

use branchwright_domain::{
    AlternativeOutcome, BranchId, BranchMood, BranchPremise, BranchTrajectory, BranchVariation,
    CharacterArcProjection, CharacterProfile, Complexity, ConsequenceScope, ContextPackage,
    DomainError, PremiseId,
};

use crate::infrastructure::ports::RandomPort;
use templates::pick;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The context cannot be branched from (no or unknown selected alternative)
    #[error("Invalid context: {0}")]
    InvalidContext(#[from] DomainError),
}

/// Generates candidate branch variations.
pub struct VariationGenerator {
    random: Arc<dyn RandomPort>,
}

impl VariationGenerator {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }

    /// Generate up to `requested` candidates.
    ///
    /// The count is clamped to `1..=significance ceiling`; callers must not
    /// assume their request is honored verbatim.
    pub fn generate(
        &self,
        context: &ContextPackage,
        requested: usize,
    ) -> Result<Vec<BranchVariation>, GenerationError> {
        let alternative = context.anchor.selected_alternative()?;
        let ceiling = context.anchor.significance.max_variations();
        let count = requested.clamp(1, ceiling);
        if count != requested {
            tracing::debug!(
                anchor_id = %context.anchor.id,
                requested,
                ceiling,
                count,
                "Clamped requested variation count"
            );
        }

        let variations: Vec<BranchVariation> = (0..count)
            .map(|index| self.build_candidate(context, alternative, index))
            .collect();

        tracing::info!(
            anchor_id = %context.anchor.id,
            significance = context.anchor.significance.as_str(),
            count = variations.len(),
            "Generated branch variations"
        );
        Ok(variations)
    }

    fn build_candidate(
        &self,
        context: &ContextPackage,
        alternative: &AlternativeOutcome,
        index: usize,
    ) -> BranchVariation {
        let scope = ConsequenceScope::for_index(index);
        let mood = BranchMood::for_index(index);
        let involved = context.involved_characters();

        let premise = self.build_premise(context, alternative, &involved, scope, mood);
        let character_arcs = self.build_arcs(&involved, mood);
        let trajectory = self.build_trajectory(context, alternative, &involved, scope, mood);

        let mut theme_progression: Vec<String> = premise.themes.iter().take(3).cloned().collect();
        theme_progression.push(templates::closing_theme(mood).to_string());

        let complexity = Complexity::for_anchor(context.anchor.significance, scope);
        let estimated_chapters = complexity.estimated_chapters(character_arcs.len());

        BranchVariation {
            id: BranchId::from_uuid(self.random.gen_uuid()),
            anchor_id: context.anchor.id,
            premise,
            trajectory,
            consequence_scope: scope,
            theme_progression,
            mood,
            complexity,
            estimated_chapters,
            character_arcs,
        }
    }

    fn build_premise(
        &self,
        context: &ContextPackage,
        alternative: &AlternativeOutcome,
        involved: &[&CharacterProfile],
        scope: ConsequenceScope,
        mood: BranchMood,
    ) -> BranchPremise {
        let lead = lead_name(involved);

        let immediate_consequences: Vec<String> = alternative
            .consequences
            .iter()
            .cloned()
            .chain(templates::scope_consequences(scope, &lead))
            .take(BranchPremise::MAX_IMMEDIATE_CONSEQUENCES)
            .collect();

        let long_term_implications: Vec<String> = templates::long_term_implications(scope, mood)
            .into_iter()
            .chain(
                alternative
                    .consequences
                    .iter()
                    .skip(BranchPremise::MAX_IMMEDIATE_CONSEQUENCES)
                    .cloned(),
            )
            .take(BranchPremise::MAX_LONG_TERM_IMPLICATIONS)
            .collect();

        BranchPremise {
            id: PremiseId::from_uuid(self.random.gen_uuid()),
            alternative_id: alternative.id,
            title: format!("{}: {}", alternative.title, templates::title_suffix(mood, scope)),
            subtitle: templates::subtitle(scope).to_string(),
            hook: format!(
                "On page {}, {} turns another way, and {} is the first to feel it.",
                context.anchor.page_number,
                lower_first(&context.anchor.title),
                lead
            ),
            what_if: format!("What if {}?", lower_first(alternative.title.trim_end_matches('.'))),
            description: alternative.description.clone(),
            themes: infer_themes(context, scope, mood),
            affected_characters: involved.iter().map(|c| c.name.clone()).collect(),
            immediate_consequences,
            long_term_implications,
        }
    }

    fn build_arcs(
        &self,
        involved: &[&CharacterProfile],
        mood: BranchMood,
    ) -> Vec<CharacterArcProjection> {
        involved
            .iter()
            .map(|character| {
                let options = mood.growth_options();
                let growth = options[self.random.gen_index(options.len())];
                let starting_state = if character.current_state.trim().is_empty() {
                    format!("{} as the anchor finds them", character.name)
                } else {
                    character.current_state.clone()
                };
                let arc_description = pick(
                    self.random.as_ref(),
                    templates::arc_description_options(growth),
                )
                .replace("{name}", &character.name);
                let ending_state = pick(
                    self.random.as_ref(),
                    templates::ending_state_options(growth),
                )
                .to_string();
                CharacterArcProjection {
                    character_id: character.id,
                    character_name: character.name.clone(),
                    starting_state,
                    arc_description,
                    ending_state,
                    growth,
                }
            })
            .collect()
    }

    fn build_trajectory(
        &self,
        context: &ContextPackage,
        alternative: &AlternativeOutcome,
        involved: &[&CharacterProfile],
        scope: ConsequenceScope,
        mood: BranchMood,
    ) -> BranchTrajectory {
        let lead = lead_name(involved);
        let endings = mood.ending_options();
        let ending_type = endings[self.random.gen_index(endings.len())];

        let second_event = alternative
            .consequences
            .first()
            .cloned()
            .unwrap_or_else(|| {
                templates::scope_consequences(scope, &lead)
                    .into_iter()
                    .next()
                    .unwrap_or_default()
            });

        BranchTrajectory {
            summary: format!(
                "After {}, {} follows a {} course with {} consequences.",
                lower_first(alternative.title.trim_end_matches('.')),
                lead,
                mood.as_str(),
                scope.as_str()
            ),
            key_events: vec![
                format!(
                    "{} unfolds differently on page {}",
                    context.anchor.title, context.anchor.page_number
                ),
                second_event,
                templates::escalation(mood).to_string(),
            ],
            turning_points: templates::turning_points(scope, mood),
            climax: pick(self.random.as_ref(), templates::climax_options(mood)).to_string(),
            resolution: pick(self.random.as_ref(), templates::resolution_options(ending_type))
                .to_string(),
            ending_type,
        }
    }
}

/// Up to four themes: narrative type, mood, scope, then the work's recurring
/// themes, deduplicated in that order.
fn infer_themes(context: &ContextPackage, scope: ConsequenceScope, mood: BranchMood) -> Vec<String> {
    let mut seen = BTreeSet::new();
    templates::narrative_themes(context.anchor.narrative_type)
        .iter()
        .map(|t| t.to_string())
        .chain(std::iter::once(templates::mood_theme(mood).to_string()))
        .chain(std::iter::once(templates::scope_theme(scope).to_string()))
        .chain(context.style.recurring_themes.iter().map(|t| t.trim().to_lowercase()))
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .take(BranchPremise::MAX_THEMES)
        .collect()
}

fn lead_name(involved: &[&CharacterProfile]) -> String {
    involved
        .first()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "the protagonist".to_string())
}

/// Lowercase a leading article so the text reads mid-sentence; anything
/// else (likely a name) is kept.
fn lower_first(text: &str) -> String {
    let first_word = text.split_whitespace().next().unwrap_or_default();
    if matches!(first_word, "The" | "A" | "An") {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        text.to_string()
    }
}
