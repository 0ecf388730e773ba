//! Anchor vocabulary: what kind of story moment a branch diverges from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// The narrative kind of an anchor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NarrativeType {
    Decision,
    Coincidence,
    Revelation,
    Betrayal,
    Sacrifice,
    Encounter,
    Conflict,
    Transformation,
    Mystery,
}

impl NarrativeType {
    pub fn all() -> &'static [NarrativeType] {
        &[
            NarrativeType::Decision,
            NarrativeType::Coincidence,
            NarrativeType::Revelation,
            NarrativeType::Betrayal,
            NarrativeType::Sacrifice,
            NarrativeType::Encounter,
            NarrativeType::Conflict,
            NarrativeType::Transformation,
            NarrativeType::Mystery,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeType::Decision => "decision",
            NarrativeType::Coincidence => "coincidence",
            NarrativeType::Revelation => "revelation",
            NarrativeType::Betrayal => "betrayal",
            NarrativeType::Sacrifice => "sacrifice",
            NarrativeType::Encounter => "encounter",
            NarrativeType::Conflict => "conflict",
            NarrativeType::Transformation => "transformation",
            NarrativeType::Mystery => "mystery",
        }
    }
}

impl fmt::Display for NarrativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NarrativeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NarrativeType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| DomainError::parse(format!("Unknown narrative type: {}", s)))
    }
}

/// How much weight an anchor carries in the larger work.
///
/// Significance caps how many candidate branches may be generated from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Significance {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl Significance {
    /// Hard ceiling on candidate branches for an anchor of this significance.
    pub fn max_variations(&self) -> usize {
        match self {
            Significance::Minor => 2,
            Significance::Moderate => 3,
            Significance::Major => 4,
            Significance::Critical => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Significance::Minor => "minor",
            Significance::Moderate => "moderate",
            Significance::Major => "major",
            Significance::Critical => "critical",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Significance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Ok(Significance::Minor),
            "moderate" => Ok(Significance::Moderate),
            "major" => Ok(Significance::Major),
            "critical" => Ok(Significance::Critical),
            _ => Err(DomainError::parse(format!("Unknown significance: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_ceilings() {
        assert_eq!(Significance::Minor.max_variations(), 2);
        assert_eq!(Significance::Moderate.max_variations(), 3);
        assert_eq!(Significance::Major.max_variations(), 4);
        assert_eq!(Significance::Critical.max_variations(), 5);
    }

    #[test]
    fn test_narrative_type_parses_all_variants() {
        for kind in NarrativeType::all() {
            assert_eq!(kind.as_str().parse::<NarrativeType>().unwrap(), *kind);
        }
        assert!("heist".parse::<NarrativeType>().is_err());
    }

    #[test]
    fn test_significance_serialization() {
        let json = serde_json::to_string(&Significance::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
