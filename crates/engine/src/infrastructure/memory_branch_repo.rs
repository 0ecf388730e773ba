//! In-memory branch repository
//!
//! Keeps records in a `HashMap` behind a tokio `RwLock`. Nothing is persisted,
//! so it suits the CLI, tests and embedding hosts that own storage themselves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use branchwright_domain::{
    AnchorId, BranchId, BranchRecord, BranchRecordPatch, BranchStatus, BranchVariation,
};

use crate::infrastructure::ports::{BranchRepo, ClockPort, RepoError};

pub struct InMemoryBranchRepo {
    records: Arc<RwLock<HashMap<BranchId, BranchRecord>>>,
    clock: Arc<dyn ClockPort>,
}

impl InMemoryBranchRepo {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

#[async_trait]
impl BranchRepo for InMemoryBranchRepo {
    async fn create(&self, variation: BranchVariation) -> Result<BranchRecord, RepoError> {
        let mut records = self.records.write().await;
        if records.contains_key(&variation.id) {
            return Err(RepoError::constraint(format!(
                "Branch {} already exists",
                variation.id
            )));
        }
        let record = BranchRecord::new(variation, self.clock.now());
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: BranchId) -> Result<Option<BranchRecord>, RepoError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: BranchId,
        patch: BranchRecordPatch,
    ) -> Result<BranchRecord, RepoError> {
        let now = self.clock.now();
        let selecting = patch.status == Some(BranchStatus::Selected);
        let mut records = self.records.write().await;
        // Work on a copy so a failing field leaves the stored record untouched
        let mut updated = records
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Branch", id))?;
        updated.apply(patch, now)?;
        if selecting {
            demote_selected_siblings(&mut records, &updated, now)?;
        }
        records.insert(id, updated.clone());
        Ok(updated)
    }

    async fn list_for_anchor(&self, anchor_id: AnchorId) -> Result<Vec<BranchRecord>, RepoError> {
        let records = self.records.read().await;
        let mut matching: Vec<BranchRecord> = records
            .values()
            .filter(|r| r.anchor_id() == anchor_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| (r.created_at(), r.id()));
        Ok(matching)
    }

    async fn select(&self, id: BranchId) -> Result<BranchRecord, RepoError> {
        let now = self.clock.now();
        let mut records = self.records.write().await;

        let mut target = records
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Branch", id))?;
        target.transition(BranchStatus::Selected, now)?;
        demote_selected_siblings(&mut records, &target, now)?;

        records.insert(id, target.clone());
        Ok(target)
    }
}

/// Move every other selected branch of the target's anchor back to review.
fn demote_selected_siblings(
    records: &mut HashMap<BranchId, BranchRecord>,
    target: &BranchRecord,
    now: DateTime<Utc>,
) -> Result<(), RepoError> {
    let previously_selected: Vec<BranchId> = records
        .values()
        .filter(|r| r.anchor_id() == target.anchor_id() && r.id() != target.id() && r.is_selected())
        .map(BranchRecord::id)
        .collect();
    for other_id in previously_selected {
        if let Some(other) = records.get_mut(&other_id) {
            other.transition(BranchStatus::Review, now)?;
            tracing::info!(branch_id = %other_id, "Demoted previously selected branch to review");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockClockPort;
    use crate::test_fixtures;
    use branchwright_domain::{BlockingIssue, BlockingSource, BranchTrajectory};

    fn repo() -> InMemoryBranchRepo {
        InMemoryBranchRepo::new(Arc::new(FixedClock(Utc::now())))
    }

    #[tokio::test]
    async fn when_selecting_second_branch_then_first_is_demoted() {
        let repo = repo();
        let first = test_fixtures::variation();
        let second = first.as_sibling(BranchId::new());
        repo.create(first.clone()).await.unwrap();
        repo.create(second.clone()).await.unwrap();

        repo.select(first.id).await.unwrap();
        repo.select(second.id).await.unwrap();

        let records = repo.list_for_anchor(first.anchor_id).await.unwrap();
        let selected: Vec<_> = records.iter().filter(|r| r.is_selected()).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), second.id);
        let demoted = repo.get(first.id).await.unwrap().unwrap();
        assert_eq!(demoted.status(), BranchStatus::Review);
    }

    #[tokio::test]
    async fn when_selecting_unknown_branch_then_not_found() {
        let err = repo().select(BranchId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn when_updating_variation_then_version_bumps() {
        let repo = repo();
        let v = test_fixtures::variation();
        repo.create(v.clone()).await.unwrap();

        let updated = repo
            .update(
                v.id,
                BranchRecordPatch {
                    variation: Some(v.with_estimated_chapters(9)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.version(), 2);
        assert_eq!(updated.variation().estimated_chapters, 9);
    }

    #[tokio::test]
    async fn when_patch_fails_then_record_is_untouched() {
        let repo = repo();
        let v = test_fixtures::variation();
        repo.create(v.clone()).await.unwrap();
        repo.update(
            v.id,
            BranchRecordPatch {
                status: Some(BranchStatus::Archived),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = repo
            .update(
                v.id,
                BranchRecordPatch {
                    variation: Some(v.with_estimated_chapters(9)),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(repo.get(v.id).await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn when_creating_duplicate_then_constraint_error() {
        let repo = repo();
        let v = test_fixtures::variation();
        repo.create(v.clone()).await.unwrap();
        assert!(matches!(
            repo.create(v).await,
            Err(RepoError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn when_record_changes_then_updated_at_comes_from_clock() {
        let created = Utc::now();
        let later = created + chrono::Duration::hours(1);
        let mut calls = 0;
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(move || {
            calls += 1;
            if calls == 1 {
                created
            } else {
                later
            }
        });
        let repo = InMemoryBranchRepo::new(Arc::new(clock));
        let v = test_fixtures::variation();

        let record = repo.create(v.clone()).await.unwrap();
        assert_eq!(record.created_at(), created);

        let updated = repo
            .update(
                v.id,
                BranchRecordPatch {
                    status: Some(BranchStatus::Review),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.created_at(), created);
        assert_eq!(updated.updated_at(), later);
    }

    #[tokio::test]
    async fn when_patch_selects_then_other_fields_are_kept_and_sibling_demoted() {
        let repo = repo();
        let first = test_fixtures::variation();
        let second = first.as_sibling(BranchId::new());
        repo.create(first.clone()).await.unwrap();
        repo.create(second.clone()).await.unwrap();
        repo.select(first.id).await.unwrap();

        let refined = second.with_trajectory(BranchTrajectory {
            climax: "The gate holds because Ilse opens it herself".into(),
            ..second.trajectory.clone()
        });
        let issues = vec![BlockingIssue {
            source: BlockingSource::Validation,
            description: "stakes-clarity scored below the critical threshold".into(),
        }];
        let updated = repo
            .update(
                second.id,
                BranchRecordPatch {
                    variation: Some(refined.clone()),
                    blocking_issues: Some(issues.clone()),
                    status: Some(BranchStatus::Selected),
                },
            )
            .await
            .unwrap();

        assert!(updated.is_selected());
        assert_eq!(updated.version(), 2);
        assert_eq!(updated.variation(), &refined);
        assert_eq!(updated.blocking_issues(), issues.as_slice());
        let stored = repo.get(second.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        let demoted = repo.get(first.id).await.unwrap().unwrap();
        assert_eq!(demoted.status(), BranchStatus::Review);
    }
}
