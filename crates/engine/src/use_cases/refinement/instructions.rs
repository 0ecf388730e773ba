//! Map free-text user instructions to refinement areas.

use std::sync::LazyLock;

use regex_lite::Regex;

use branchwright_domain::RefinementArea;

static AREA_PATTERNS: LazyLock<Vec<(RefinementArea, Regex)>> = LazyLock::new(|| {
    [
        (RefinementArea::DialogueQuality, r"(?i)\b(dialog(ue)?|conversation|speech|voice|says?)\b"),
        (RefinementArea::CharacterDepth, r"(?i)\b(character|arcs?|motivation|personality|growth)\b"),
        (RefinementArea::PlotCoherence, r"(?i)\b(plot|story|events?|logic|coheren\w*|twists?)\b"),
        (RefinementArea::ThemeDevelopment, r"(?i)\b(themes?|meaning|message|symbol\w*)\b"),
        (RefinementArea::EmotionalImpact, r"(?i)\b(emotion\w*|feel\w*|climax|moving|tension)\b"),
        (RefinementArea::Pacing, r"(?i)\b(pac(e|ing)|slow(er)?|fast(er)?|rushed|chapters?|length)\b"),
        (RefinementArea::WorldBuilding, r"(?i)\b(world|setting|culture|politic\w*|factions?|locations?)\b"),
        (RefinementArea::StakesClarity, r"(?i)\b(stakes?|consequences?|risks?|costs?)\b"),
    ]
    .into_iter()
    .map(|(area, pattern)| (area, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Areas an instruction asks for, in area order.
///
/// An instruction naming no known area is treated as a plot request.
pub fn areas_for(instruction: &str) -> Vec<RefinementArea> {
    let areas: Vec<RefinementArea> = AREA_PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(instruction))
        .map(|(area, _)| *area)
        .collect();
    if areas.is_empty() {
        vec![RefinementArea::PlotCoherence]
    } else {
        areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_area() {
        assert_eq!(
            areas_for("Give the climax more tension"),
            vec![RefinementArea::EmotionalImpact]
        );
        assert_eq!(
            areas_for("Mara's dialogue feels stiff"),
            vec![RefinementArea::DialogueQuality, RefinementArea::EmotionalImpact]
        );
    }

    #[test]
    fn test_multiple_areas_in_area_order() {
        assert_eq!(
            areas_for("The pacing is rushed and the stakes are unclear"),
            vec![RefinementArea::Pacing, RefinementArea::StakesClarity]
        );
    }

    #[test]
    fn test_unknown_instruction_defaults_to_plot() {
        assert_eq!(areas_for("Hmm, try again"), vec![RefinementArea::PlotCoherence]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(areas_for("More WORLD detail"), vec![RefinementArea::WorldBuilding]);
    }
}
