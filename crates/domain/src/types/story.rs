//! Branch vocabulary: scope, mood, complexity, endings and character growth.
//!
//! Mood is the pivot of a branch's emotional shape. The mood -> ending and
//! mood -> growth pairings live here as exhaustive matches so that adding a
//! mood forces every consumer to decide how it ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::types::Significance;

/// How far-reaching a branch's consequences are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsequenceScope {
    Personal,
    Political,
    Cosmic,
}

impl ConsequenceScope {
    /// Fixed rotation used when differentiating successive candidates.
    pub const ROTATION: [ConsequenceScope; 3] = [
        ConsequenceScope::Personal,
        ConsequenceScope::Political,
        ConsequenceScope::Cosmic,
    ];

    /// Scope for the candidate at `index` in a generation run.
    pub fn for_index(index: usize) -> Self {
        Self::ROTATION[index % Self::ROTATION.len()]
    }

    fn rank(&self) -> i32 {
        match self {
            ConsequenceScope::Personal => 0,
            ConsequenceScope::Political => 1,
            ConsequenceScope::Cosmic => 2,
        }
    }

    /// Distance on the personal -> political -> cosmic ladder.
    pub fn distance(&self, other: &ConsequenceScope) -> u32 {
        (self.rank() - other.rank()).unsigned_abs()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsequenceScope::Personal => "personal",
            ConsequenceScope::Political => "political",
            ConsequenceScope::Cosmic => "cosmic",
        }
    }
}

impl fmt::Display for ConsequenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional register of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchMood {
    Hopeful,
    Tragic,
    Mixed,
    Dark,
}

impl BranchMood {
    /// Fixed rotation used when differentiating successive candidates.
    pub const ROTATION: [BranchMood; 4] = [
        BranchMood::Hopeful,
        BranchMood::Tragic,
        BranchMood::Mixed,
        BranchMood::Dark,
    ];

    /// Mood for the candidate at `index` in a generation run.
    pub fn for_index(index: usize) -> Self {
        Self::ROTATION[index % Self::ROTATION.len()]
    }

    /// Ending types a branch of this mood may close on.
    pub fn ending_options(&self) -> &'static [EndingType] {
        match self {
            BranchMood::Hopeful => &[EndingType::Hopeful],
            BranchMood::Tragic => &[EndingType::Tragic],
            BranchMood::Dark => &[EndingType::Tragic, EndingType::Ambiguous],
            BranchMood::Mixed => &[EndingType::Bittersweet, EndingType::Ambiguous],
        }
    }

    /// Whether `ending` is a legal pairing for this mood.
    pub fn allows_ending(&self, ending: EndingType) -> bool {
        self.ending_options().contains(&ending)
    }

    /// Character growth classifications consistent with this mood.
    pub fn growth_options(&self) -> &'static [GrowthType] {
        match self {
            BranchMood::Hopeful => &[GrowthType::Positive],
            BranchMood::Tragic => &[GrowthType::Negative],
            BranchMood::Dark => &[GrowthType::Negative, GrowthType::Complex],
            BranchMood::Mixed => &[GrowthType::Complex],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchMood::Hopeful => "hopeful",
            BranchMood::Tragic => "tragic",
            BranchMood::Mixed => "mixed",
            BranchMood::Dark => "dark",
        }
    }
}

impl fmt::Display for BranchMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchMood {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hopeful" => Ok(BranchMood::Hopeful),
            "tragic" => Ok(BranchMood::Tragic),
            "mixed" => Ok(BranchMood::Mixed),
            "dark" => Ok(BranchMood::Dark),
            _ => Err(DomainError::parse(format!("Unknown mood: {}", s))),
        }
    }
}

/// Structural complexity of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Complexity implied by anchor significance and consequence scope.
    ///
    /// Cosmic scope or a critical anchor always yields `Complex`.
    pub fn for_anchor(significance: Significance, scope: ConsequenceScope) -> Self {
        match (significance, scope) {
            (Significance::Critical, _) | (_, ConsequenceScope::Cosmic) => Complexity::Complex,
            (Significance::Major, _) | (_, ConsequenceScope::Political) => Complexity::Moderate,
            _ => Complexity::Simple,
        }
    }

    /// Chapter count before per-character additions.
    pub fn base_chapters(&self) -> u32 {
        match self {
            Complexity::Simple => 3,
            Complexity::Moderate => 5,
            Complexity::Complex => 8,
        }
    }

    /// Estimated chapters for a branch following `character_count` characters.
    pub fn estimated_chapters(&self, character_count: usize) -> u32 {
        self.base_chapters() + (character_count / 2) as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a branch's trajectory resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndingType {
    Hopeful,
    Tragic,
    Bittersweet,
    Ambiguous,
    Open,
}

impl EndingType {
    pub fn all() -> &'static [EndingType] {
        &[
            EndingType::Hopeful,
            EndingType::Tragic,
            EndingType::Bittersweet,
            EndingType::Ambiguous,
            EndingType::Open,
        ]
    }

    /// Whether two endings leave readers in a related place.
    ///
    /// Hopeful/bittersweet share some light, tragic/bittersweet share loss,
    /// ambiguous/open both withhold closure.
    pub fn is_related(&self, other: &EndingType) -> bool {
        matches!(
            (self, other),
            (EndingType::Hopeful, EndingType::Bittersweet)
                | (EndingType::Bittersweet, EndingType::Hopeful)
                | (EndingType::Tragic, EndingType::Bittersweet)
                | (EndingType::Bittersweet, EndingType::Tragic)
                | (EndingType::Ambiguous, EndingType::Open)
                | (EndingType::Open, EndingType::Ambiguous)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndingType::Hopeful => "hopeful",
            EndingType::Tragic => "tragic",
            EndingType::Bittersweet => "bittersweet",
            EndingType::Ambiguous => "ambiguous",
            EndingType::Open => "open",
        }
    }
}

impl fmt::Display for EndingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a character's arc within a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthType {
    Positive,
    Negative,
    Neutral,
    Complex,
}

impl GrowthType {
    pub fn all() -> &'static [GrowthType] {
        &[
            GrowthType::Positive,
            GrowthType::Negative,
            GrowthType::Neutral,
            GrowthType::Complex,
        ]
    }

    /// True when the two directions point opposite ways.
    pub fn reverses(&self, other: &GrowthType) -> bool {
        matches!(
            (self, other),
            (GrowthType::Positive, GrowthType::Negative)
                | (GrowthType::Negative, GrowthType::Positive)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthType::Positive => "positive",
            GrowthType::Negative => "negative",
            GrowthType::Neutral => "neutral",
            GrowthType::Complex => "complex",
        }
    }
}

impl fmt::Display for GrowthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_ending_pairings() {
        assert!(BranchMood::Hopeful.allows_ending(EndingType::Hopeful));
        assert!(!BranchMood::Hopeful.allows_ending(EndingType::Bittersweet));
        assert!(BranchMood::Tragic.allows_ending(EndingType::Tragic));
        assert!(BranchMood::Dark.allows_ending(EndingType::Ambiguous));
        assert!(!BranchMood::Dark.allows_ending(EndingType::Hopeful));
        assert!(BranchMood::Mixed.allows_ending(EndingType::Bittersweet));
        assert!(!BranchMood::Mixed.allows_ending(EndingType::Open));
    }

    #[test]
    fn test_rotations_cycle() {
        assert_eq!(ConsequenceScope::for_index(0), ConsequenceScope::Personal);
        assert_eq!(ConsequenceScope::for_index(4), ConsequenceScope::Political);
        assert_eq!(BranchMood::for_index(3), BranchMood::Dark);
        assert_eq!(BranchMood::for_index(4), BranchMood::Hopeful);
    }

    #[test]
    fn test_complexity_for_anchor() {
        assert_eq!(
            Complexity::for_anchor(Significance::Minor, ConsequenceScope::Cosmic),
            Complexity::Complex
        );
        assert_eq!(
            Complexity::for_anchor(Significance::Critical, ConsequenceScope::Personal),
            Complexity::Complex
        );
        assert_eq!(
            Complexity::for_anchor(Significance::Minor, ConsequenceScope::Political),
            Complexity::Moderate
        );
        assert_eq!(
            Complexity::for_anchor(Significance::Moderate, ConsequenceScope::Personal),
            Complexity::Simple
        );
    }

    #[test]
    fn test_estimated_chapters() {
        assert_eq!(Complexity::Simple.estimated_chapters(0), 3);
        assert_eq!(Complexity::Moderate.estimated_chapters(3), 6);
        assert_eq!(Complexity::Complex.estimated_chapters(4), 10);
    }

    #[test]
    fn test_scope_distance() {
        assert_eq!(
            ConsequenceScope::Personal.distance(&ConsequenceScope::Cosmic),
            2
        );
        assert_eq!(
            ConsequenceScope::Cosmic.distance(&ConsequenceScope::Political),
            1
        );
    }
}
