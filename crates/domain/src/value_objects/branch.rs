//! Branch variation value objects.
//!
//! A `BranchVariation` is never edited in place. Refinement and fixes build a
//! new value through the `with_*` constructors, keeping the id of the lineage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{BranchMood, Complexity, ConsequenceScope, EndingType, GrowthType};
use crate::{AlternativeId, AnchorId, BranchId, CharacterId, PremiseId};

/// The premise a branch explores, derived once from an alternative outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchPremise {
    pub id: PremiseId,
    pub alternative_id: AlternativeId,
    pub title: String,
    pub subtitle: String,
    pub hook: String,
    pub what_if: String,
    pub description: String,
    /// At most four inferred themes
    pub themes: Vec<String>,
    pub affected_characters: Vec<String>,
    /// At most three
    pub immediate_consequences: Vec<String>,
    /// At most four
    pub long_term_implications: Vec<String>,
}

impl BranchPremise {
    pub const MAX_THEMES: usize = 4;
    pub const MAX_IMMEDIATE_CONSEQUENCES: usize = 3;
    pub const MAX_LONG_TERM_IMPLICATIONS: usize = 4;

    /// Concatenated descriptive text, used by pattern-based checks.
    pub fn text(&self) -> String {
        let mut parts = vec![
            self.title.as_str(),
            self.subtitle.as_str(),
            self.hook.as_str(),
            self.what_if.as_str(),
            self.description.as_str(),
        ];
        parts.extend(self.immediate_consequences.iter().map(String::as_str));
        parts.extend(self.long_term_implications.iter().map(String::as_str));
        join_sentences(&parts)
    }
}

/// Where a branch goes once it leaves the anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchTrajectory {
    pub summary: String,
    pub key_events: Vec<String>,
    pub turning_points: Vec<String>,
    pub climax: String,
    pub resolution: String,
    pub ending_type: EndingType,
}

impl BranchTrajectory {
    pub fn text(&self) -> String {
        let mut parts = vec![self.summary.as_str()];
        parts.extend(self.key_events.iter().map(String::as_str));
        parts.extend(self.turning_points.iter().map(String::as_str));
        parts.push(self.climax.as_str());
        parts.push(self.resolution.as_str());
        join_sentences(&parts)
    }
}

/// Projected arc of one character within a branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterArcProjection {
    pub character_id: CharacterId,
    pub character_name: String,
    pub starting_state: String,
    pub arc_description: String,
    pub ending_state: String,
    pub growth: GrowthType,
}

impl CharacterArcProjection {
    pub fn text(&self) -> String {
        join_sentences(&[self.arc_description.as_str(), self.ending_state.as_str()])
    }

    /// True when the arc ends where it started.
    pub fn is_static(&self) -> bool {
        self.starting_state.trim().eq_ignore_ascii_case(self.ending_state.trim())
    }
}

/// One synthesized alternate continuation from an anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchVariation {
    pub id: BranchId,
    pub anchor_id: AnchorId,
    pub premise: BranchPremise,
    pub trajectory: BranchTrajectory,
    pub consequence_scope: ConsequenceScope,
    pub theme_progression: Vec<String>,
    pub mood: BranchMood,
    pub complexity: Complexity,
    pub estimated_chapters: u32,
    pub character_arcs: Vec<CharacterArcProjection>,
}

impl BranchVariation {
    /// Same lineage, new premise.
    pub fn with_premise(&self, premise: BranchPremise) -> Self {
        Self {
            premise,
            ..self.clone()
        }
    }

    /// Same lineage, new trajectory.
    pub fn with_trajectory(&self, trajectory: BranchTrajectory) -> Self {
        Self {
            trajectory,
            ..self.clone()
        }
    }

    /// Same lineage, new character arcs.
    pub fn with_character_arcs(&self, character_arcs: Vec<CharacterArcProjection>) -> Self {
        Self {
            character_arcs,
            ..self.clone()
        }
    }

    /// Same lineage, new theme progression.
    pub fn with_theme_progression(&self, theme_progression: Vec<String>) -> Self {
        Self {
            theme_progression,
            ..self.clone()
        }
    }

    /// Same lineage, new chapter estimate.
    pub fn with_estimated_chapters(&self, estimated_chapters: u32) -> Self {
        Self {
            estimated_chapters,
            ..self.clone()
        }
    }

    /// A distinct sibling candidate: identical content under a fresh id.
    pub fn as_sibling(&self, id: BranchId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Premise, trajectory and arc text joined for pattern-based checks.
    pub fn narrative_text(&self) -> String {
        let arcs: Vec<String> = self.character_arcs.iter().map(|a| a.text()).collect();
        let mut parts = vec![self.premise.text(), self.trajectory.text()];
        parts.extend(arcs);
        join_sentences(&parts.iter().map(String::as_str).collect::<Vec<_>>())
    }

    /// Arc for a character, if the branch projects one.
    pub fn arc_for(&self, character_id: CharacterId) -> Option<&CharacterArcProjection> {
        self.character_arcs
            .iter()
            .find(|a| a.character_id == character_id)
    }

    /// Lowercased union of premise themes and theme progression.
    pub fn theme_set(&self) -> BTreeSet<String> {
        self.premise
            .themes
            .iter()
            .chain(self.theme_progression.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Whether mood and ending type form a legal pairing.
    pub fn mood_matches_ending(&self) -> bool {
        self.mood.allows_ending(self.trajectory.ending_type)
    }
}

fn join_sentences(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim().trim_end_matches('.'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_variation() -> BranchVariation {
        let character_id = CharacterId::new();
        BranchVariation {
            id: BranchId::new(),
            anchor_id: AnchorId::new(),
            premise: BranchPremise {
                id: PremiseId::new(),
                alternative_id: AlternativeId::new(),
                title: "The Gate Holds".into(),
                subtitle: "A personal reckoning".into(),
                hook: "One refusal changes a city.".into(),
                what_if: "What if the guard refused the bribe?".into(),
                description: "The siege drags on.".into(),
                themes: vec!["Loyalty".into(), "duty".into()],
                affected_characters: vec!["Mara".into()],
                immediate_consequences: vec!["The rebels are locked out".into()],
                long_term_implications: vec![],
            },
            trajectory: BranchTrajectory {
                summary: "The city endures".into(),
                key_events: vec!["The bribe is refused".into()],
                turning_points: vec![],
                climax: "The walls are breached anyway".into(),
                resolution: "Mara rebuilds".into(),
                ending_type: EndingType::Hopeful,
            },
            consequence_scope: ConsequenceScope::Personal,
            theme_progression: vec!["duty".into(), "sacrifice".into()],
            mood: BranchMood::Hopeful,
            complexity: Complexity::Simple,
            estimated_chapters: 3,
            character_arcs: vec![CharacterArcProjection {
                character_id,
                character_name: "Mara".into(),
                starting_state: "a loyal guard".into(),
                arc_description: "Mara holds the line".into(),
                ending_state: "captain of the watch".into(),
                growth: GrowthType::Positive,
            }],
        }
    }

    #[test]
    fn test_with_constructors_keep_lineage_id() {
        let original = sample_variation();
        let revised = original.with_theme_progression(vec!["hope".into()]);
        assert_eq!(revised.id, original.id);
        assert_eq!(revised.theme_progression, vec!["hope".to_string()]);
        assert_eq!(original.theme_progression.len(), 2);
    }

    #[test]
    fn test_sibling_gets_new_id() {
        let original = sample_variation();
        let sibling = original.as_sibling(BranchId::new());
        assert_ne!(sibling.id, original.id);
        assert_eq!(sibling.premise, original.premise);
    }

    #[test]
    fn test_theme_set_merges_and_lowercases() {
        let v = sample_variation();
        let themes = v.theme_set();
        assert!(themes.contains("loyalty"));
        assert!(themes.contains("duty"));
        assert_eq!(themes.len(), 3);
    }

    #[test]
    fn test_narrative_text_includes_all_parts() {
        let v = sample_variation();
        let text = v.narrative_text();
        assert!(text.contains("What if the guard refused the bribe?"));
        assert!(text.contains("The walls are breached anyway"));
        assert!(text.contains("Mara holds the line"));
    }

    #[test]
    fn test_mood_matches_ending() {
        let v = sample_variation();
        assert!(v.mood_matches_ending());
        let broken = v.with_trajectory(BranchTrajectory {
            ending_type: EndingType::Tragic,
            ..v.trajectory.clone()
        });
        assert!(!broken.mood_matches_ending());
    }
}
