//! Test fixtures loader for JSON fixture files and common test helpers.
//!
//! This module provides utilities for loading test data from the `test_data/` directory
//! and prebuilt branch values that agree with the fixture context.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures;
//!
//! #[test]
//! fn test_branch_passes() {
//!     let context = test_fixtures::context();
//!     let variation = test_fixtures::variation();
//!     // ... test logic
//! }
//! ```

pub mod prose_fakes;

use std::path::PathBuf;

use branchwright_domain::{
    BranchId, BranchMood, BranchPremise, BranchTrajectory, BranchVariation,
    CharacterArcProjection, CharacterId, Complexity, ConsequenceScope, ContextPackage, EndingType,
    GrowthType, PremiseId,
};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

// =============================================================================
// Context Fixtures
// =============================================================================

/// The siege of Veyl: a major betrayal anchor with Mara and Ilse involved.
pub fn context() -> ContextPackage {
    load_fixture("context_package.json")
}

pub fn mara_id() -> CharacterId {
    character_id("Mara")
}

pub fn ilse_id() -> CharacterId {
    character_id("Ilse")
}

fn character_id(name: &str) -> CharacterId {
    context()
        .characters
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .unwrap_or_else(|| panic!("fixture character '{}' missing", name))
}

// =============================================================================
// Branch Fixtures
// =============================================================================

/// A complete hopeful branch consistent with `context()`.
///
/// Passes every validator: both involved characters have non-static positive
/// arcs, the siege is engaged, no world rule is touched.
pub fn variation() -> BranchVariation {
    let context = context();
    let alternative_id = context
        .anchor
        .selected_alternative_id
        .unwrap_or_else(|| panic!("fixture anchor has no selected alternative"));

    BranchVariation {
        id: BranchId::new(),
        anchor_id: context.anchor.id,
        premise: BranchPremise {
            id: PremiseId::new(),
            alternative_id,
            title: "The gate stays shut: A Hopeful Personal Path".into(),
            subtitle: "A personal reckoning".into(),
            hook: "On page 212, the gate is opened turns another way, and Mara is the first to feel it."
                .into(),
            what_if: "What if the gate stays shut?".into(),
            description: "Mara refuses the bribe and the east gate holds through the night.".into(),
            themes: vec![
                "trust".into(),
                "loyalty".into(),
                "redemption".into(),
                "belonging".into(),
            ],
            affected_characters: vec!["Mara".into(), "Ilse".into()],
            immediate_consequences: vec![
                "The rebel vanguard is trapped outside the walls".into(),
                "Ilse's bargain with the rebels is exposed".into(),
                "Mara must live with what the choice has cost".into(),
            ],
            long_term_implications: vec![
                "The people involved are defined by this moment for years".into(),
                "A path toward healing stays open".into(),
            ],
        },
        trajectory: BranchTrajectory {
            summary: "After the gate stays shut, Mara follows a hopeful course through the siege."
                .into(),
            key_events: vec![
                "The gate is opened unfolds differently on page 212".into(),
                "The rebel vanguard is trapped outside the walls".into(),
                "An unexpected ally offers a way forward".into(),
            ],
            turning_points: vec![
                "A private confession changes what everyone thought they knew".into(),
                "A long-held fear is faced and overcome".into(),
            ],
            climax: "The final confrontation at the east gate turns on an act of trust that pays off"
                .into(),
            resolution: "The survivors of the City Watch find a way to rebuild together".into(),
            ending_type: EndingType::Hopeful,
        },
        consequence_scope: ConsequenceScope::Personal,
        theme_progression: vec![
            "trust".into(),
            "loyalty".into(),
            "redemption".into(),
            "renewal".into(),
        ],
        mood: BranchMood::Hopeful,
        complexity: Complexity::Moderate,
        estimated_chapters: 6,
        character_arcs: vec![
            CharacterArcProjection {
                character_id: mara_id(),
                character_name: "Mara".into(),
                starting_state: "a loyal guard of the east gate".into(),
                arc_description: "Mara confronts her limits and grows into someone stronger".into(),
                ending_state: "stronger and more certain of her purpose".into(),
                growth: GrowthType::Positive,
            },
            CharacterArcProjection {
                character_id: ilse_id(),
                character_name: "Ilse".into(),
                starting_state: "a sergeant with debts to the rebels".into(),
                arc_description: "Ilse learns to carry the weight of the choice and is better for it"
                    .into(),
                ending_state: "at peace with the choice and what it cost".into(),
                growth: GrowthType::Positive,
            },
        ],
    }
}

/// A second, clearly different branch over the same anchor.
pub fn dark_variation() -> BranchVariation {
    let base = variation();
    let premise = BranchPremise {
        id: PremiseId::new(),
        title: "The gate stays shut: A Darker Cosmic Path".into(),
        subtitle: "The order of the world is rewritten".into(),
        themes: vec!["corruption".into(), "destiny".into(), "power".into()],
        immediate_consequences: vec![
            "The change ripples outward into forces no one controls".into(),
        ],
        long_term_implications: vec!["Something irreplaceable is lost for good".into()],
        ..base.premise.clone()
    };
    let trajectory = BranchTrajectory {
        summary: "Sealing the gate wakes something beneath the citadel.".into(),
        key_events: vec![
            "Old wards beneath the citadel crack".into(),
            "A compromise quietly becomes a corruption".into(),
            "The watch turns on itself".into(),
        ],
        turning_points: vec!["A line is crossed that cannot be uncrossed".into()],
        climax: "Power is seized in a moment that leaves no one clean".into(),
        resolution: "The outcome remains uncertain, its meaning left to those who remain".into(),
        ending_type: EndingType::Ambiguous,
    };
    let arcs = base
        .character_arcs
        .iter()
        .map(|arc| CharacterArcProjection {
            arc_description: format!("{} is pulled between who they were and who the change demands", arc.character_name),
            ending_state: "changed, carrying both new strength and new scars".into(),
            growth: GrowthType::Complex,
            ..arc.clone()
        })
        .collect();

    BranchVariation {
        id: BranchId::new(),
        premise,
        trajectory,
        consequence_scope: ConsequenceScope::Cosmic,
        theme_progression: vec!["corruption".into(), "power".into(), "ruin".into()],
        mood: BranchMood::Dark,
        complexity: Complexity::Complex,
        estimated_chapters: 9,
        character_arcs: arcs,
        ..base
    }
}
