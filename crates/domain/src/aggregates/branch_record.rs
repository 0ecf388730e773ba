//! BranchRecord aggregate - a persisted branch variation and its review state
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──► Review ──► Selected
//!   │         ▲  │         │
//!   │         └──┼─────────┘  (demoted when another branch is selected)
//!   └────────────┴──► Archived
//! ```
//!
//! At most one record per anchor holds `Selected`. That is enforced by the
//! repository, which demotes the previous selection; the aggregate only
//! guards its own transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::events::BranchRecordUpdate;
use crate::value_objects::BranchVariation;
use crate::{AnchorId, BranchId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchStatus {
    Draft,
    Review,
    Selected,
    Archived,
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStatus::Draft => f.write_str("draft"),
            BranchStatus::Review => f.write_str("review"),
            BranchStatus::Selected => f.write_str("selected"),
            BranchStatus::Archived => f.write_str("archived"),
        }
    }
}

/// Where a blocking issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockingSource {
    /// A validation dimension below the critical threshold
    Validation,
    /// A rejected character deviation
    Deviation,
    /// An unresolved critical fix
    Fix,
}

/// A critical or core finding that must be shown before selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingIssue {
    pub source: BlockingSource,
    pub description: String,
}

/// Partial update applied through the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchRecordPatch {
    pub variation: Option<BranchVariation>,
    pub blocking_issues: Option<Vec<BlockingIssue>>,
    pub status: Option<BranchStatus>,
}

/// A persisted branch.
///
/// # Invariants
///
/// - `variation.id == id` for the whole lineage
/// - `version` starts at 1 and grows by one per replaced variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    id: BranchId,
    anchor_id: AnchorId,
    variation: BranchVariation,
    status: BranchStatus,
    version: u32,
    blocking_issues: Vec<BlockingIssue>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BranchRecord {
    pub fn new(variation: BranchVariation, now: DateTime<Utc>) -> Self {
        Self {
            id: variation.id,
            anchor_id: variation.anchor_id,
            variation,
            status: BranchStatus::Draft,
            version: 1,
            blocking_issues: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> BranchId {
        self.id
    }

    #[inline]
    pub fn anchor_id(&self) -> AnchorId {
        self.anchor_id
    }

    #[inline]
    pub fn variation(&self) -> &BranchVariation {
        &self.variation
    }

    #[inline]
    pub fn status(&self) -> BranchStatus {
        self.status
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn blocking_issues(&self) -> &[BlockingIssue] {
        &self.blocking_issues
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.status == BranchStatus::Selected
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace the variation with a refined or fixed one of the same lineage.
    pub fn replace_variation(
        &mut self,
        variation: BranchVariation,
        now: DateTime<Utc>,
    ) -> Result<BranchRecordUpdate, DomainError> {
        if variation.id != self.id {
            return Err(DomainError::constraint(format!(
                "Variation {} does not belong to branch {}",
                variation.id, self.id
            )));
        }
        self.ensure_not_archived()?;
        self.variation = variation;
        self.version += 1;
        self.updated_at = now;
        Ok(BranchRecordUpdate::VariationReplaced {
            version: self.version,
        })
    }

    pub fn set_blocking_issues(
        &mut self,
        issues: Vec<BlockingIssue>,
        now: DateTime<Utc>,
    ) -> BranchRecordUpdate {
        let from = self.blocking_issues.len();
        let to = issues.len();
        if self.blocking_issues == issues {
            return BranchRecordUpdate::Unchanged;
        }
        self.blocking_issues = issues;
        self.updated_at = now;
        BranchRecordUpdate::BlockingIssuesChanged { from, to }
    }

    /// Move to a new status if the lifecycle allows it.
    pub fn transition(
        &mut self,
        to: BranchStatus,
        now: DateTime<Utc>,
    ) -> Result<BranchRecordUpdate, DomainError> {
        let from = self.status;
        if from == to {
            return Ok(BranchRecordUpdate::Unchanged);
        }
        let allowed = matches!(
            (from, to),
            (BranchStatus::Draft, BranchStatus::Review)
                | (BranchStatus::Draft, BranchStatus::Selected)
                | (BranchStatus::Review, BranchStatus::Selected)
                | (BranchStatus::Selected, BranchStatus::Review)
                | (_, BranchStatus::Archived)
        ) && from != BranchStatus::Archived;
        if !allowed {
            return Err(DomainError::invalid_state_transition(format!(
                "Branch {} cannot move from {} to {}",
                self.id, from, to
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(BranchRecordUpdate::StatusChanged { from, to })
    }

    /// Apply a partial update. Each present field is applied in turn.
    pub fn apply(
        &mut self,
        patch: BranchRecordPatch,
        now: DateTime<Utc>,
    ) -> Result<Vec<BranchRecordUpdate>, DomainError> {
        let mut updates = Vec::new();
        if let Some(variation) = patch.variation {
            updates.push(self.replace_variation(variation, now)?);
        }
        if let Some(issues) = patch.blocking_issues {
            updates.push(self.set_blocking_issues(issues, now));
        }
        if let Some(status) = patch.status {
            updates.push(self.transition(status, now)?);
        }
        Ok(updates)
    }

    fn ensure_not_archived(&self) -> Result<(), DomainError> {
        if self.status == BranchStatus::Archived {
            return Err(DomainError::invalid_state_transition(format!(
                "Branch {} is archived",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BranchMood, Complexity, ConsequenceScope, EndingType};
    use crate::value_objects::{BranchPremise, BranchTrajectory};
    use crate::{AlternativeId, PremiseId};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn variation() -> BranchVariation {
        BranchVariation {
            id: BranchId::new(),
            anchor_id: AnchorId::new(),
            premise: BranchPremise {
                id: PremiseId::new(),
                alternative_id: AlternativeId::new(),
                title: "t".into(),
                subtitle: String::new(),
                hook: String::new(),
                what_if: String::new(),
                description: String::new(),
                themes: vec![],
                affected_characters: vec![],
                immediate_consequences: vec![],
                long_term_implications: vec![],
            },
            trajectory: BranchTrajectory {
                summary: String::new(),
                key_events: vec![],
                turning_points: vec![],
                climax: String::new(),
                resolution: String::new(),
                ending_type: EndingType::Hopeful,
            },
            consequence_scope: ConsequenceScope::Personal,
            theme_progression: vec![],
            mood: BranchMood::Hopeful,
            complexity: Complexity::Simple,
            estimated_chapters: 3,
            character_arcs: vec![],
        }
    }

    #[test]
    fn test_new_record_is_draft_version_one() {
        let record = BranchRecord::new(variation(), now());
        assert_eq!(record.status(), BranchStatus::Draft);
        assert_eq!(record.version(), 1);
    }

    #[test]
    fn test_replace_variation_bumps_version() {
        let v = variation();
        let mut record = BranchRecord::new(v.clone(), now());
        let refined = v.with_estimated_chapters(7);
        let update = record.replace_variation(refined, now()).unwrap();
        assert_eq!(update, BranchRecordUpdate::VariationReplaced { version: 2 });
        assert_eq!(record.variation().estimated_chapters, 7);
    }

    #[test]
    fn test_replace_variation_rejects_other_lineage() {
        let mut record = BranchRecord::new(variation(), now());
        let err = record.replace_variation(variation(), now()).unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn test_archived_is_terminal() {
        let mut record = BranchRecord::new(variation(), now());
        record.transition(BranchStatus::Archived, now()).unwrap();
        let err = record.transition(BranchStatus::Review, now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn test_selected_can_be_demoted_to_review() {
        let mut record = BranchRecord::new(variation(), now());
        record.transition(BranchStatus::Selected, now()).unwrap();
        let update = record.transition(BranchStatus::Review, now()).unwrap();
        assert_eq!(
            update,
            BranchRecordUpdate::StatusChanged {
                from: BranchStatus::Selected,
                to: BranchStatus::Review
            }
        );
    }

    #[test]
    fn test_review_cannot_go_back_to_draft() {
        let mut record = BranchRecord::new(variation(), now());
        record.transition(BranchStatus::Review, now()).unwrap();
        assert!(record.transition(BranchStatus::Draft, now()).is_err());
    }
}
