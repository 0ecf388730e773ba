//! Phrase tables for generated premises, trajectories and arcs.
//!
//! Every table is a closed `match` over the domain enums. Where several
//! phrasings fit, the caller picks one through `RandomPort` so seeded runs
//! reproduce the same text.

use branchwright_domain::{
    BranchMood, ConsequenceScope, EndingType, GrowthType, NarrativeType,
};

use crate::infrastructure::ports::RandomPort;

/// Pick one phrase from a non-empty table.
pub(crate) fn pick<'a>(random: &dyn RandomPort, options: &[&'a str]) -> &'a str {
    options
        .get(random.gen_index(options.len()))
        .copied()
        .unwrap_or_default()
}

pub(crate) fn narrative_themes(narrative_type: NarrativeType) -> &'static [&'static str] {
    match narrative_type {
        NarrativeType::Decision => &["choice", "consequence"],
        NarrativeType::Coincidence => &["fate", "chance"],
        NarrativeType::Revelation => &["truth", "identity"],
        NarrativeType::Betrayal => &["trust", "loyalty"],
        NarrativeType::Sacrifice => &["sacrifice", "duty"],
        NarrativeType::Encounter => &["connection", "change"],
        NarrativeType::Conflict => &["power", "survival"],
        NarrativeType::Transformation => &["identity", "growth"],
        NarrativeType::Mystery => &["truth", "secrets"],
    }
}

pub(crate) fn mood_theme(mood: BranchMood) -> &'static str {
    match mood {
        BranchMood::Hopeful => "redemption",
        BranchMood::Tragic => "loss",
        BranchMood::Mixed => "compromise",
        BranchMood::Dark => "corruption",
    }
}

pub(crate) fn scope_theme(scope: ConsequenceScope) -> &'static str {
    match scope {
        ConsequenceScope::Personal => "belonging",
        ConsequenceScope::Political => "power",
        ConsequenceScope::Cosmic => "destiny",
    }
}

pub(crate) fn subtitle(scope: ConsequenceScope) -> &'static str {
    match scope {
        ConsequenceScope::Personal => "A personal reckoning",
        ConsequenceScope::Political => "The balance of power shifts",
        ConsequenceScope::Cosmic => "The order of the world is rewritten",
    }
}

pub(crate) fn title_suffix(mood: BranchMood, scope: ConsequenceScope) -> String {
    let tone = match mood {
        BranchMood::Hopeful => "A Hopeful",
        BranchMood::Tragic => "A Tragic",
        BranchMood::Mixed => "A Divided",
        BranchMood::Dark => "A Darker",
    };
    let path = match scope {
        ConsequenceScope::Personal => "Personal Path",
        ConsequenceScope::Political => "Political Path",
        ConsequenceScope::Cosmic => "Cosmic Path",
    };
    format!("{} {}", tone, path)
}

pub(crate) fn scope_consequences(scope: ConsequenceScope, lead: &str) -> Vec<String> {
    match scope {
        ConsequenceScope::Personal => vec![
            format!("{} must live with what the choice has cost", lead),
            "Bonds between the people closest to the event are tested".to_string(),
            "Private loyalties are quietly redrawn".to_string(),
        ],
        ConsequenceScope::Political => vec![
            "Alliances realign around the new reality".to_string(),
            "Those in power scramble to claim the outcome".to_string(),
            "Old rivals find common cause".to_string(),
        ],
        ConsequenceScope::Cosmic => vec![
            "The change ripples outward into forces no one controls".to_string(),
            "Signs of a deeper order begin to surface".to_string(),
            "What was thought fixed proves fragile".to_string(),
        ],
    }
}

pub(crate) fn long_term_implications(scope: ConsequenceScope, mood: BranchMood) -> Vec<String> {
    let mut implications = match scope {
        ConsequenceScope::Personal => vec![
            "The people involved are defined by this moment for years".to_string(),
            "A new sense of who they are takes root".to_string(),
        ],
        ConsequenceScope::Political => vec![
            "The structure of power is permanently altered".to_string(),
            "A new faction rises from the upheaval".to_string(),
        ],
        ConsequenceScope::Cosmic => vec![
            "The world's foundations are reshaped".to_string(),
            "Future generations inherit a different order".to_string(),
        ],
    };
    implications.push(
        match mood {
            BranchMood::Hopeful => "A path toward healing stays open",
            BranchMood::Tragic => "The loss echoes through everything that follows",
            BranchMood::Mixed => "Every gain is shadowed by what it cost",
            BranchMood::Dark => "Something irreplaceable is lost for good",
        }
        .to_string(),
    );
    implications
}

pub(crate) fn escalation(mood: BranchMood) -> &'static str {
    match mood {
        BranchMood::Hopeful => "An unexpected ally offers a way forward",
        BranchMood::Tragic => "A chance to turn back is missed",
        BranchMood::Mixed => "A victory is won at a price no one expected",
        BranchMood::Dark => "A compromise quietly becomes a corruption",
    }
}

pub(crate) fn turning_points(scope: ConsequenceScope, mood: BranchMood) -> Vec<String> {
    let first = match scope {
        ConsequenceScope::Personal => "A private confession changes what everyone thought they knew",
        ConsequenceScope::Political => "A public declaration forces every faction to choose a side",
        ConsequenceScope::Cosmic => "An ancient force stirs in answer to the change",
    };
    let second = match mood {
        BranchMood::Hopeful => "A long-held fear is faced and overcome",
        BranchMood::Tragic => "The last chance to avert disaster slips away",
        BranchMood::Mixed => "A hard bargain is struck that no one fully wants",
        BranchMood::Dark => "A line is crossed that cannot be uncrossed",
    };
    vec![first.to_string(), second.to_string()]
}

pub(crate) fn climax_options(mood: BranchMood) -> &'static [&'static str] {
    match mood {
        BranchMood::Hopeful => &[
            "Against the odds, the threads of the story come together in a hard-won triumph",
            "The final confrontation turns on an act of trust that pays off",
        ],
        BranchMood::Tragic => &[
            "The confrontation everyone feared arrives, and it cannot be won",
            "The final choice is made too late to save what mattered most",
        ],
        BranchMood::Mixed => &[
            "The final confrontation ends in a victory that no one can fully celebrate",
            "What is saved and what is lost are weighed in a single decisive moment",
        ],
        BranchMood::Dark => &[
            "The final confrontation reveals how far everyone has fallen",
            "Power is seized in a moment that leaves no one clean",
        ],
    }
}

pub(crate) fn resolution_options(ending: EndingType) -> &'static [&'static str] {
    match ending {
        EndingType::Hopeful => &[
            "A new beginning takes shape from what survived",
            "The survivors find a way to rebuild together",
        ],
        EndingType::Tragic => &[
            "What was lost cannot be recovered, and the survivors carry it forward",
            "The story closes on ruin and the memory of what might have been",
        ],
        EndingType::Bittersweet => &[
            "Peace is reached, though not everyone lives to see it",
            "The goal is achieved at a cost that will never be forgotten",
        ],
        EndingType::Ambiguous => &[
            "The outcome remains uncertain, its meaning left to those who remain",
            "Victory and defeat blur into something harder to name",
        ],
        EndingType::Open => &[
            "The story pauses at a threshold, with many roads still open",
            "A new question rises as the old one is answered",
        ],
    }
}

pub(crate) fn arc_description_options(growth: GrowthType) -> &'static [&'static str] {
    match growth {
        GrowthType::Positive => &[
            "{name} confronts their limits and grows into someone stronger",
            "{name} learns to carry the weight of the choice and is better for it",
        ],
        GrowthType::Negative => &[
            "{name} is worn down by the consequences until little of their old self remains",
            "{name} makes one bitter compromise after another and loses their way",
        ],
        GrowthType::Neutral => &[
            "{name} weathers the change without being remade by it",
            "{name} holds steady while the world shifts around them",
        ],
        GrowthType::Complex => &[
            "{name} gains clarity and loses innocence in equal measure",
            "{name} is pulled between who they were and who the change demands",
        ],
    }
}

pub(crate) fn ending_state_options(growth: GrowthType) -> &'static [&'static str] {
    match growth {
        GrowthType::Positive => &[
            "stronger and more certain of their purpose",
            "at peace with the choice and what it cost",
        ],
        GrowthType::Negative => &[
            "diminished and haunted by what they have done",
            "broken by the weight of the consequences",
        ],
        GrowthType::Neutral => &[
            "much as they began, though wiser about the world",
            "unchanged at heart but no longer naive",
        ],
        GrowthType::Complex => &[
            "transformed in ways that are neither wholly good nor bad",
            "changed, carrying both new strength and new scars",
        ],
    }
}

pub(crate) fn closing_theme(mood: BranchMood) -> &'static str {
    match mood {
        BranchMood::Hopeful => "renewal",
        BranchMood::Tragic => "grief",
        BranchMood::Mixed => "acceptance",
        BranchMood::Dark => "ruin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;

    #[test]
    fn test_pick_is_driven_by_random_port() {
        let options = ["first", "second"];
        assert_eq!(pick(&FixedRandom(0), &options), "first");
        assert_eq!(pick(&FixedRandom(1), &options), "second");
    }

    #[test]
    fn test_every_growth_has_phrases() {
        for growth in GrowthType::all() {
            assert!(!arc_description_options(*growth).is_empty());
            assert!(!ending_state_options(*growth).is_empty());
        }
    }

    #[test]
    fn test_every_ending_has_resolutions() {
        for ending in EndingType::all() {
            assert!(!resolution_options(*ending).is_empty());
        }
    }
}
