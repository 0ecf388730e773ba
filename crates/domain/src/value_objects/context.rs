//! Context package value objects.
//!
//! A `ContextPackage` is assembled by upstream context-gathering code and is
//! the only input the generator and validators need: the anchor event, the
//! characters involved, the current world state and the work's style profile.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::{GrowthType, NarrativeType, Significance};
use crate::value_objects::WorldRule;
use crate::{AlternativeId, AnchorId, CharacterId};

/// Everything known about the story at the anchor point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextPackage {
    pub anchor: AnchorDetails,
    #[serde(default)]
    pub characters: Vec<CharacterProfile>,
    #[serde(default)]
    pub world: WorldState,
    #[serde(default)]
    pub style: StyleProfile,
}

impl ContextPackage {
    /// Look up a character by id.
    pub fn character(&self, id: CharacterId) -> Option<&CharacterProfile> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Characters involved in the anchor, in anchor order.
    ///
    /// Ids that do not resolve to a known profile are skipped. When the anchor
    /// names nobody, every known character is considered involved.
    pub fn involved_characters(&self) -> Vec<&CharacterProfile> {
        if self.anchor.involved_character_ids.is_empty() {
            return self.characters.iter().collect();
        }
        self.anchor
            .involved_character_ids
            .iter()
            .filter_map(|id| self.character(*id))
            .collect()
    }
}

/// One possible outcome of an anchor event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeOutcome {
    pub id: AlternativeId,
    pub title: String,
    pub description: String,
    /// Consequences the author already sketched for this outcome
    #[serde(default)]
    pub consequences: Vec<String>,
}

/// The anchor event a branch diverges from. Immutable once extracted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnchorDetails {
    pub id: AnchorId,
    pub narrative_type: NarrativeType,
    pub significance: Significance,
    pub page_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The alternative the user chose to explore
    #[serde(default)]
    pub selected_alternative_id: Option<AlternativeId>,
    #[serde(default)]
    pub alternatives: Vec<AlternativeOutcome>,
    #[serde(default)]
    pub involved_character_ids: Vec<CharacterId>,
}

impl AnchorDetails {
    /// The alternative outcome selected for branching.
    ///
    /// Fails when nothing is selected or the selection is not part of the
    /// alternative set. Never falls back to another alternative.
    pub fn selected_alternative(&self) -> Result<&AlternativeOutcome, DomainError> {
        let selected = self.selected_alternative_id.ok_or_else(|| {
            DomainError::validation(format!("Anchor {} has no selected alternative", self.id))
        })?;
        self.alternatives
            .iter()
            .find(|alt| alt.id == selected)
            .ok_or_else(|| DomainError::not_found("AlternativeOutcome", selected.to_string()))
    }
}

/// Moral stance a character is established with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MoralAlignment {
    Good,
    #[default]
    Neutral,
    Evil,
}

/// A character as established in the source work up to the anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub alignment: MoralAlignment,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub motivation: Option<String>,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub habits: Vec<String>,
    #[serde(default)]
    pub surface_behaviors: Vec<String>,
    /// Where the character stands at the anchor
    #[serde(default)]
    pub current_state: String,
    /// Direction of the character's arc so far, if the work has one
    #[serde(default)]
    pub established_growth: Option<GrowthType>,
}

impl CharacterProfile {
    /// Minimal profile, mostly useful for tests and fixtures.
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            alignment: MoralAlignment::Neutral,
            values: Vec::new(),
            motivation: None,
            personality: Vec::new(),
            skills: Vec::new(),
            relationships: Vec::new(),
            goals: Vec::new(),
            preferences: Vec::new(),
            habits: Vec::new(),
            surface_behaviors: Vec::new(),
            current_state: String::new(),
            established_growth: None,
        }
    }
}

/// World state at the anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub active_conflicts: Vec<String>,
    #[serde(default)]
    pub rules: Vec<WorldRule>,
    /// Names of characters who are dead by the anchor point
    #[serde(default)]
    pub deceased_characters: Vec<String>,
}

/// Overall register of the source work's prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToneRegister {
    Light,
    #[default]
    Balanced,
    Dark,
}

/// How quickly the source work moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PacingStyle {
    Fast,
    #[default]
    Measured,
    Slow,
}

/// Narrative style profile of the source work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    #[serde(default)]
    pub tone: ToneRegister,
    #[serde(default)]
    pub pacing: PacingStyle,
    /// Themes the work keeps returning to
    #[serde(default)]
    pub recurring_themes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_with(selected: Option<AlternativeId>, alternatives: Vec<AlternativeOutcome>) -> AnchorDetails {
        AnchorDetails {
            id: AnchorId::new(),
            narrative_type: NarrativeType::Betrayal,
            significance: Significance::Major,
            page_number: 212,
            title: "The gate is opened".into(),
            description: String::new(),
            selected_alternative_id: selected,
            alternatives,
            involved_character_ids: vec![],
        }
    }

    #[test]
    fn test_missing_selection_is_an_error() {
        let anchor = anchor_with(None, vec![]);
        let err = anchor.selected_alternative().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_selection_outside_alternative_set_is_an_error() {
        let anchor = anchor_with(Some(AlternativeId::new()), vec![]);
        let err = anchor.selected_alternative().unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn test_selected_alternative_resolves() {
        let alt = AlternativeOutcome {
            id: AlternativeId::new(),
            title: "The gate stays shut".into(),
            description: "the guard refuses the bribe".into(),
            consequences: vec![],
        };
        let anchor = anchor_with(Some(alt.id), vec![alt.clone()]);
        assert_eq!(anchor.selected_alternative().unwrap(), &alt);
    }

    #[test]
    fn test_involved_characters_falls_back_to_everyone() {
        let anchor = anchor_with(None, vec![]);
        let context = ContextPackage {
            anchor,
            characters: vec![
                CharacterProfile::new(CharacterId::new(), "Mara"),
                CharacterProfile::new(CharacterId::new(), "Ilse"),
            ],
            world: WorldState::default(),
            style: StyleProfile::default(),
        };
        assert_eq!(context.involved_characters().len(), 2);
    }

    #[test]
    fn test_context_deserializes_with_defaults() {
        let json = format!(
            r#"{{"anchor":{{"id":"{}","narrativeType":"decision","significance":"minor","pageNumber":3,"title":"A choice"}}}}"#,
            AnchorId::new()
        );
        let context: ContextPackage = serde_json::from_str(&json).unwrap();
        assert!(context.characters.is_empty());
        assert_eq!(context.style.tone, ToneRegister::Balanced);
    }
}
