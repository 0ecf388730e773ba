//! Deterministic, offline prose adapter.
//!
//! Extends the current text with a fixed sentence per refinement area. Useful
//! for the CLI and for tests; a host application plugs a real text generator
//! into `ProsePort` instead.

use async_trait::async_trait;
use branchwright_domain::RefinementArea;

use crate::infrastructure::ports::{ProseError, ProsePort, ProseRequest};

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateProse;

impl TemplateProse {
    pub fn new() -> Self {
        Self
    }

    fn addition(area: RefinementArea) -> &'static str {
        match area {
            RefinementArea::CharacterDepth => {
                "Old certainties are tested, and a harder-won conviction takes their place."
            }
            RefinementArea::PlotCoherence => {
                "Each step follows from the last, and the cost of every choice is carried forward."
            }
            RefinementArea::ThemeDevelopment => {
                "The question at the heart of the story returns, sharper each time it is asked."
            }
            RefinementArea::EmotionalImpact => {
                "Everything that was risked comes due at once, and nobody walks away unchanged."
            }
            RefinementArea::DialogueQuality => {
                "What is said aloud and what is left unsaid pull in different directions."
            }
            RefinementArea::Pacing => {
                "Quiet stretches give the turning points room to land before the next blow."
            }
            RefinementArea::WorldBuilding => {
                "The wider world answers in kind, its factions and customs shifting around the change."
            }
            RefinementArea::StakesClarity => {
                "Failure would cost more than a life: it would cost what that life was for."
            }
        }
    }
}

#[async_trait]
impl ProsePort for TemplateProse {
    async fn rewrite(&self, request: ProseRequest) -> Result<String, ProseError> {
        let addition = Self::addition(request.area);
        let current = request.current_text.trim();
        if current.contains(addition) {
            return Ok(current.to_string());
        }
        if current.is_empty() {
            return Ok(addition.to_string());
        }
        let separator = if current.ends_with(['.', '!', '?']) { " " } else { ". " };
        Ok(format!("{}{}{}", current, separator, addition))
    }
}
