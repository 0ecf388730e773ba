//! Area-specific refiners.
//!
//! Each refiner takes the current variation and returns a new one plus the
//! changes it made. Descriptive text goes through the prose port; structural
//! additions (arcs, events, themes, consequences) are built from the context.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use branchwright_domain::common::word_count;
use branchwright_domain::{
    BranchPremise, BranchTrajectory, BranchVariation, CharacterArcProjection, ContextPackage,
    DomainError, GrowthType, RefinementArea, RefinementChange,
};

use crate::infrastructure::ports::{ProseError, ProsePort, ProseRequest};

use super::critique::{MIN_ARC_WORDS, MIN_SUMMARY_WORDS};

/// Why a refinement step did not produce a variation.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StepError {
    #[error("Refinement cancelled")]
    Cancelled,
    #[error(transparent)]
    Failed(#[from] ProseError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One prose backend call bounded by a timeout and a cancellation token.
pub(crate) struct ProseCall<'a> {
    prose: &'a dyn ProsePort,
    timeout: Duration,
    cancel: &'a CancellationToken,
}

impl<'a> ProseCall<'a> {
    pub(crate) fn new(
        prose: &'a dyn ProsePort,
        timeout: Duration,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            prose,
            timeout,
            cancel,
        }
    }

    pub(crate) async fn rewrite(&self, request: ProseRequest) -> Result<String, StepError> {
        let field = request.field.clone();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StepError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.prose.rewrite(request)) => {
                match result {
                    Ok(Ok(text)) => Ok(text),
                    Ok(Err(e)) => Err(StepError::Failed(e)),
                    Err(_) => {
                        let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                        tracing::warn!(field = %field, timeout_ms = ms, "Prose rewrite timed out");
                        Err(StepError::Failed(ProseError::Timeout(ms)))
                    }
                }
            }
        }
    }
}

/// Output of a single refiner run.
pub(crate) struct Refined {
    pub variation: BranchVariation,
    pub changes: Vec<RefinementChange>,
}

/// Accumulates changes against a working copy of the variation.
struct Draft<'a> {
    area: RefinementArea,
    reason: &'a str,
    call: &'a ProseCall<'a>,
    title: String,
    changes: Vec<RefinementChange>,
}

impl<'a> Draft<'a> {
    fn new(area: RefinementArea, reason: &'a str, call: &'a ProseCall<'a>, title: &str) -> Self {
        Self {
            area,
            reason,
            call,
            title: title.to_string(),
            changes: Vec::new(),
        }
    }

    /// Rewrite `current` through the prose port and record the change.
    async fn rewrite(&mut self, field: &str, current: &str) -> Result<String, StepError> {
        self.rewrite_seeded(field, current, current).await
    }

    /// Rewrite `seeded` (an amended `original`) and record the change
    /// against `original`.
    async fn rewrite_seeded(
        &mut self,
        field: &str,
        original: &str,
        seeded: &str,
    ) -> Result<String, StepError> {
        let request = ProseRequest::new(self.area, field, seeded, self.reason, self.title.as_str());
        let after = self.call.rewrite(request).await?;
        self.record(field, original, &after);
        Ok(after)
    }

    fn record(&mut self, field: &str, before: &str, after: &str) {
        if before == after {
            return;
        }
        self.changes.push(RefinementChange {
            area: self.area,
            field: field.to_string(),
            before: before.to_string(),
            after: after.to_string(),
            reason: self.reason.to_string(),
        });
    }

    fn finish(self, variation: BranchVariation) -> Refined {
        Refined {
            variation,
            changes: self.changes,
        }
    }
}

/// Run the refiner for `area`. `reason` is the critique message or user
/// instruction that prompted it.
pub(crate) async fn refine_area(
    area: RefinementArea,
    variation: &BranchVariation,
    context: &ContextPackage,
    reason: &str,
    call: &ProseCall<'_>,
) -> Result<Refined, StepError> {
    let mut draft = Draft::new(area, reason, call, &variation.premise.title);
    let refined = match area {
        RefinementArea::CharacterDepth => character_depth(&mut draft, variation, context).await?,
        RefinementArea::PlotCoherence => plot_coherence(&mut draft, variation, context).await?,
        RefinementArea::ThemeDevelopment => {
            theme_development(&mut draft, variation, context).await?
        }
        RefinementArea::EmotionalImpact => {
            let climax = draft
                .rewrite("trajectory.climax", &variation.trajectory.climax)
                .await?;
            variation.with_trajectory(BranchTrajectory {
                climax,
                ..variation.trajectory.clone()
            })
        }
        RefinementArea::DialogueQuality => {
            let hook = draft.rewrite("premise.hook", &variation.premise.hook).await?;
            variation.with_premise(BranchPremise {
                hook,
                ..variation.premise.clone()
            })
        }
        RefinementArea::Pacing => pacing(&mut draft, variation).await?,
        RefinementArea::WorldBuilding => world_building(&mut draft, variation, context).await?,
        RefinementArea::StakesClarity => stakes_clarity(&mut draft, variation, context),
    };
    Ok(draft.finish(refined))
}

// =============================================================================
// Refiners
// =============================================================================

async fn character_depth(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
    context: &ContextPackage,
) -> Result<BranchVariation, StepError> {
    let mut arcs = Vec::with_capacity(variation.character_arcs.len());
    for arc in &variation.character_arcs {
        let shallow = arc.is_static() || word_count(&arc.arc_description) < MIN_ARC_WORDS;
        if !shallow {
            arcs.push(arc.clone());
            continue;
        }
        let field = format!("characterArcs.{}", arc.character_name);
        let arc_description = draft
            .rewrite(&format!("{}.arcDescription", field), &arc.arc_description)
            .await?;
        let ending_state = if arc.is_static() {
            draft
                .rewrite(&format!("{}.endingState", field), &arc.ending_state)
                .await?
        } else {
            arc.ending_state.clone()
        };
        arcs.push(CharacterArcProjection {
            arc_description,
            ending_state,
            ..arc.clone()
        });
    }

    let growth = variation
        .mood
        .growth_options()
        .first()
        .copied()
        .unwrap_or(GrowthType::Complex);
    for character in context.involved_characters() {
        if arcs.iter().any(|a| a.character_id == character.id) {
            continue;
        }
        let seed = format!(
            "{} is drawn into what follows {}",
            character.name,
            variation.premise.what_if.trim_end_matches('?').to_lowercase()
        );
        let field = format!("characterArcs.{}.arcDescription", character.name);
        let arc_description = draft.rewrite(&field, &seed).await?;
        let starting_state = if character.current_state.trim().is_empty() {
            format!("{} as the story found them", character.name)
        } else {
            character.current_state.clone()
        };
        arcs.push(CharacterArcProjection {
            character_id: character.id,
            character_name: character.name.clone(),
            ending_state: format!("{}, changed by the branch", character.name),
            starting_state,
            arc_description,
            growth,
        });
    }
    Ok(variation.with_character_arcs(arcs))
}

async fn plot_coherence(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
    context: &ContextPackage,
) -> Result<BranchVariation, StepError> {
    let mut trajectory = variation.trajectory.clone();

    let summary = draft.rewrite("trajectory.summary", &trajectory.summary).await?;
    trajectory.summary = summary;

    if trajectory.key_events.len() < 3 {
        let before = trajectory.key_events.join("; ");
        let consequences = context
            .anchor
            .selected_alternative()
            .map(|alt| alt.consequences.clone())
            .unwrap_or_default();
        let fillers = consequences
            .into_iter()
            .chain(variation.premise.immediate_consequences.iter().cloned())
            .chain(std::iter::once(format!(
                "The fallout of {} reaches everyone involved",
                context.anchor.title.to_lowercase()
            )));
        for event in fillers {
            if trajectory.key_events.len() >= 3 {
                break;
            }
            if !trajectory.key_events.contains(&event) {
                trajectory.key_events.push(event);
            }
        }
        draft.record("trajectory.keyEvents", &before, &trajectory.key_events.join("; "));
    }

    if trajectory.turning_points.is_empty() {
        let turn = format!(
            "Midway through, the cost of {} becomes impossible to ignore",
            variation.premise.what_if.trim_start_matches("What if ").trim_end_matches('?')
        );
        draft.record("trajectory.turningPoints", "", &turn);
        trajectory.turning_points.push(turn);
    }

    if word_count(&trajectory.summary) < MIN_SUMMARY_WORDS {
        let padded = format!(
            "{} The branch follows the consequences of {} to their end.",
            trajectory.summary,
            context.anchor.title.to_lowercase()
        );
        draft.record("trajectory.summary", &trajectory.summary, &padded);
        trajectory.summary = padded;
    }
    Ok(variation.with_trajectory(trajectory))
}

async fn theme_development(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
    context: &ContextPackage,
) -> Result<BranchVariation, StepError> {
    let mut premise = variation.premise.clone();
    if premise.themes.is_empty() {
        let themes: Vec<String> = context
            .style
            .recurring_themes
            .iter()
            .take(BranchPremise::MAX_THEMES)
            .cloned()
            .collect();
        draft.record("premise.themes", "", &themes.join(", "));
        premise.themes = themes;
    }

    let mut progression = variation.theme_progression.clone();
    if progression.len() < 2 {
        let before = progression.join(", ");
        for theme in premise.themes.iter().chain(context.style.recurring_themes.iter()) {
            if progression.len() >= 3 {
                break;
            }
            if !progression.iter().any(|t| t.eq_ignore_ascii_case(theme)) {
                progression.push(theme.clone());
            }
        }
        draft.record("themeProgression", &before, &progression.join(", "));
    }

    premise.description = draft
        .rewrite("premise.description", &variation.premise.description)
        .await?;
    Ok(variation
        .with_premise(premise)
        .with_theme_progression(progression))
}

async fn pacing(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
) -> Result<BranchVariation, StepError> {
    let expected = variation
        .complexity
        .estimated_chapters(variation.character_arcs.len());
    if variation.estimated_chapters != expected {
        draft.record(
            "estimatedChapters",
            &variation.estimated_chapters.to_string(),
            &expected.to_string(),
        );
        return Ok(variation.with_estimated_chapters(expected));
    }
    let summary = draft
        .rewrite("trajectory.summary", &variation.trajectory.summary)
        .await?;
    Ok(variation.with_trajectory(BranchTrajectory {
        summary,
        ..variation.trajectory.clone()
    }))
}

async fn world_building(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
    context: &ContextPackage,
) -> Result<BranchVariation, StepError> {
    let world = &context.world;
    let anchors: Vec<&str> = world
        .locations
        .iter()
        .chain(world.factions.iter())
        .take(2)
        .map(String::as_str)
        .collect();
    let mut current = variation.premise.description.trim().to_string();
    if !anchors.is_empty() {
        let grounding = format!("The change is felt first in {}.", anchors.join(" and "));
        if !current.contains(&grounding) {
            current = if current.is_empty() {
                grounding
            } else {
                format!("{} {}", current, grounding)
            };
        }
    }
    let description = draft
        .rewrite_seeded("premise.description", &variation.premise.description, &current)
        .await?;
    Ok(variation.with_premise(BranchPremise {
        description,
        ..variation.premise.clone()
    }))
}

fn stakes_clarity(
    draft: &mut Draft<'_>,
    variation: &BranchVariation,
    context: &ContextPackage,
) -> BranchVariation {
    let mut premise = variation.premise.clone();

    if premise.immediate_consequences.is_empty() {
        let consequences: Vec<String> = context
            .anchor
            .selected_alternative()
            .map(|alt| alt.consequences.clone())
            .unwrap_or_default()
            .into_iter()
            .take(BranchPremise::MAX_IMMEDIATE_CONSEQUENCES)
            .collect();
        let consequences = if consequences.is_empty() {
            vec![format!("Everyone caught up in {} must choose a side", context.anchor.title.to_lowercase())]
        } else {
            consequences
        };
        draft.record("premise.immediateConsequences", "", &consequences.join("; "));
        premise.immediate_consequences = consequences;
    }

    if premise.long_term_implications.is_empty() {
        let implication = match premise.affected_characters.first() {
            Some(name) => format!("What {} loses here cannot be won back", name),
            None => "What is lost here cannot be won back".to_string(),
        };
        draft.record("premise.longTermImplications", "", &implication);
        premise.long_term_implications.push(implication);
    }
    variation.with_premise(premise)
}
