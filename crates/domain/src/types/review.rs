//! Review vocabulary shared by the trait, world-rule and fix validators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Severity of a reported issue, ordered from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
            Severity::Critical => f.write_str("critical"),
        }
    }
}

/// How much a world rule matters to the source work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Minor,
    Major,
    Critical,
}

/// Resistance of a character trait to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitTier {
    /// Identity-defining.
    Core,
    /// May evolve over an arc.
    Secondary,
    /// Freely mutable.
    Minor,
}

impl TraitTier {
    /// Weight of a trait of this tier in the preservation score.
    ///
    /// The three weights sum to 1.
    pub fn weight(&self) -> f64 {
        match self {
            TraitTier::Core => 0.5,
            TraitTier::Secondary => 0.3,
            TraitTier::Minor => 0.2,
        }
    }
}

impl fmt::Display for TraitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitTier::Core => f.write_str("core"),
            TraitTier::Secondary => f.write_str("secondary"),
            TraitTier::Minor => f.write_str("minor"),
        }
    }
}

/// A tracked character trait. Its tier is fixed by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitKind {
    Values,
    PrimaryMotivation,
    MoralAlignment,
    PersonalityTraits,
    Skills,
    Relationships,
    Goals,
    Preferences,
    Habits,
    SurfaceBehavior,
}

impl TraitKind {
    pub fn all() -> &'static [TraitKind] {
        &[
            TraitKind::Values,
            TraitKind::PrimaryMotivation,
            TraitKind::MoralAlignment,
            TraitKind::PersonalityTraits,
            TraitKind::Skills,
            TraitKind::Relationships,
            TraitKind::Goals,
            TraitKind::Preferences,
            TraitKind::Habits,
            TraitKind::SurfaceBehavior,
        ]
    }

    pub fn tier(&self) -> TraitTier {
        match self {
            TraitKind::Values | TraitKind::PrimaryMotivation | TraitKind::MoralAlignment => {
                TraitTier::Core
            }
            TraitKind::PersonalityTraits
            | TraitKind::Skills
            | TraitKind::Relationships
            | TraitKind::Goals => TraitTier::Secondary,
            TraitKind::Preferences | TraitKind::Habits | TraitKind::SurfaceBehavior => {
                TraitTier::Minor
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitKind::Values => "values",
            TraitKind::PrimaryMotivation => "primary-motivation",
            TraitKind::MoralAlignment => "moral-alignment",
            TraitKind::PersonalityTraits => "personality-traits",
            TraitKind::Skills => "skills",
            TraitKind::Relationships => "relationships",
            TraitKind::Goals => "goals",
            TraitKind::Preferences => "preferences",
            TraitKind::Habits => "habits",
            TraitKind::SurfaceBehavior => "surface-behavior",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraitKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| DomainError::parse(format!("Unknown trait: {}", s)))
    }
}

/// Named policy bundle controlling how much deviation is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrictnessLevel {
    Strict,
    #[default]
    Moderate,
    Flexible,
    Creative,
}

impl fmt::Display for StrictnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictnessLevel::Strict => f.write_str("strict"),
            StrictnessLevel::Moderate => f.write_str("moderate"),
            StrictnessLevel::Flexible => f.write_str("flexible"),
            StrictnessLevel::Creative => f.write_str("creative"),
        }
    }
}

impl FromStr for StrictnessLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(StrictnessLevel::Strict),
            "moderate" => Ok(StrictnessLevel::Moderate),
            "flexible" => Ok(StrictnessLevel::Flexible),
            "creative" => Ok(StrictnessLevel::Creative),
            _ => Err(DomainError::parse(format!("Unknown strictness level: {}", s))),
        }
    }
}
