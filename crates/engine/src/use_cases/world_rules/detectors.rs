//! Pattern detectors for world rules.
//!
//! Every rule category has a built-in phrase list; a rule may add its own
//! case-insensitive regex patterns on top. Detection runs sentence by
//! sentence so each violation carries the sentence that triggered it.

use regex_lite::{Regex, RegexBuilder};

use branchwright_domain::common::sentences;
use branchwright_domain::{HardRuleCategory, RuleKind, SoftRuleCategory, WorldRule};

/// Phrases that break a hard rule of the given category.
pub(crate) fn hard_phrases(category: HardRuleCategory) -> &'static [&'static str] {
    match category {
        HardRuleCategory::Physics => &[
            "defies gravity",
            "back from the dead",
            "rises from the dead",
            "turns back time",
            "time runs backward",
        ],
        HardRuleCategory::Causality => &[
            "never happened",
            "undoes the past",
            "for no reason",
            "without any cause",
        ],
        HardRuleCategory::EstablishedPowers => &[
            "suddenly gains",
            "newfound power",
            "powers out of nowhere",
            "inexplicably able",
        ],
        HardRuleCategory::PastEventPermanence => &[
            "rewrites history",
            "the past changes",
            "had never died",
            "is alive after all",
        ],
        HardRuleCategory::CharacterIdentity => &[
            "becomes someone else",
            "swaps bodies",
            "forgets who they are",
            "is replaced by an impostor",
        ],
    }
}

/// Phrases that strain a soft rule of the given category.
pub(crate) fn soft_phrases(category: SoftRuleCategory) -> &'static [&'static str] {
    match category {
        SoftRuleCategory::SocialNorms => &["publicly defies", "breaks taboo", "open scandal"],
        SoftRuleCategory::PoliticalStructure => &[
            "overthrow",
            "coup",
            "power is seized",
            "seizes the throne",
            "council is dissolved",
        ],
        SoftRuleCategory::CulturalTradition => &[
            "abandons tradition",
            "rite is broken",
            "desecrates",
        ],
        SoftRuleCategory::EconomicSystems => &[
            "coin becomes worthless",
            "markets collapse",
            "debts are forgiven",
        ],
        SoftRuleCategory::UnwrittenRules => &[
            "line is crossed",
            "breaks the code",
            "breaks an oath",
        ],
    }
}

/// Markers that a soft-rule strain is motivated by the story.
pub(crate) const JUSTIFICATION_MARKERS: &[&str] = &[
    "because",
    "forced",
    "no choice",
    "in the wake of",
    "desperate",
    "to save",
];

/// Compiled detector for one rule.
pub(crate) struct RuleDetector {
    patterns: Vec<Regex>,
    literals: Vec<String>,
}

impl RuleDetector {
    /// Compile a rule's patterns. Patterns that fail to compile fall back
    /// to literal, case-insensitive matching.
    pub fn new(rule: &WorldRule) -> Self {
        let mut patterns = Vec::new();
        let mut literals: Vec<String> = match rule.kind {
            RuleKind::Hard(category) => hard_phrases(category),
            RuleKind::Soft(category) => soft_phrases(category),
        }
        .iter()
        .map(|p| p.to_string())
        .collect();

        for pattern in &rule.patterns {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(regex) => patterns.push(regex),
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        pattern = %pattern,
                        error = %e,
                        "Invalid world rule pattern, matching literally"
                    );
                    literals.push(pattern.to_lowercase());
                }
            }
        }

        Self { patterns, literals }
    }

    /// First sentence of `text` the rule fires on.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        sentences(text).find(|sentence| self.matches(sentence))
    }

    fn matches(&self, sentence: &str) -> bool {
        let lowered = sentence.to_lowercase();
        self.literals.iter().any(|l| lowered.contains(l.as_str()))
            || self.patterns.iter().any(|p| p.is_match(sentence))
    }
}

/// Whether a sentence explains the strain it describes.
pub(crate) fn is_justified(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    JUSTIFICATION_MARKERS.iter().any(|m| lowered.contains(m))
}
