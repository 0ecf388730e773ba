//! Refinement loop: critique, targeted rewrites, convergence check.
//!
//! A `RefinementSession` holds everything needed to resume: the last
//! completed variation, the conversation log and the iteration history.
//! `RefinementLoop::refine` drives a session forward until one of the stop
//! conditions fires, checked at the top of every iteration in this order:
//!
//! 1. cancellation
//! 2. user satisfaction (explicit signal, else inferred from the conversation)
//! 3. iteration cap
//! 4. diminishing returns
//!
//! Iterations against one lineage are serialized through the registry.

mod critique;
mod instructions;
mod quality;
mod refiners;
mod registry;
mod satisfaction;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use branchwright_domain::{
    BranchId, BranchVariation, ContextPackage, CritiqueKind, DomainError, MessageId,
    RefinementArea, RefinementConversation, RefinementIteration, RefinementOptions,
    RefinementResult, StoppedReason,
};

use crate::infrastructure::ports::{ClockPort, ProsePort, RandomPort};

pub use critique::critique;
pub use instructions::areas_for;
pub use quality::quality_score;
pub use registry::{LineageGuard, RefinementRegistry};
pub use satisfaction::{inferred_satisfaction, lexical_sentiment};

use refiners::{refine_area, ProseCall, StepError};

const DEFAULT_REFINER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum RefinementError {
    #[error("A refinement is already running for branch {0}")]
    AlreadyInFlight(BranchId),
    #[error("Conversation belongs to branch {conversation}, not {variation}")]
    LineageMismatch {
        variation: BranchId,
        conversation: BranchId,
    },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

// =============================================================================
// Session
// =============================================================================

/// Persistable refinement state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementSession {
    /// Last fully completed variation
    pub variation: BranchVariation,
    pub conversation: RefinementConversation,
    pub iterations: Vec<RefinementIteration>,
}

impl RefinementSession {
    pub fn new(variation: BranchVariation) -> Self {
        let conversation = RefinementConversation::new(variation.id);
        Self {
            variation,
            conversation,
            iterations: Vec::new(),
        }
    }

    fn addressed_kinds(&self) -> BTreeSet<CritiqueKind> {
        self.iterations
            .iter()
            .flat_map(|i| i.addressed.iter().copied())
            .collect()
    }
}

// =============================================================================
// Loop
// =============================================================================

pub struct RefinementLoop {
    prose: Arc<dyn ProsePort>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    registry: RefinementRegistry,
    options: RefinementOptions,
    refiner_timeout: Duration,
}

impl RefinementLoop {
    pub fn new(
        prose: Arc<dyn ProsePort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        options: RefinementOptions,
    ) -> Self {
        Self {
            prose,
            clock,
            random,
            registry: RefinementRegistry::new(),
            options,
            refiner_timeout: DEFAULT_REFINER_TIMEOUT,
        }
    }

    pub fn with_refiner_timeout(mut self, timeout: Duration) -> Self {
        self.refiner_timeout = timeout;
        self
    }

    /// Share a registry with other loops so lineage locks span them.
    pub fn with_registry(mut self, registry: RefinementRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &RefinementRegistry {
        &self.registry
    }

    pub fn options(&self) -> &RefinementOptions {
        &self.options
    }

    /// Drive `session` until a stop condition fires.
    ///
    /// The session only ever advances by whole iterations. On cancellation or
    /// a refiner failure the partial iteration is discarded and the result
    /// carries the last completed variation.
    pub async fn refine(
        &self,
        session: &mut RefinementSession,
        context: &ContextPackage,
        cancel: &CancellationToken,
    ) -> Result<RefinementResult, RefinementError> {
        let branch_id = session.variation.id;
        if session.conversation.branch_id() != branch_id {
            return Err(RefinementError::LineageMismatch {
                variation: branch_id,
                conversation: session.conversation.branch_id(),
            });
        }
        let _guard = self.registry.acquire(branch_id)?;
        let call = ProseCall::new(self.prose.as_ref(), self.refiner_timeout, cancel);

        let reason = loop {
            if let Some(reason) = self.stop_reason(session, cancel) {
                break reason;
            }
            match self.run_iteration(session, context, &call).await {
                Ok(()) => {}
                Err(StepError::Cancelled) => break StoppedReason::Cancelled,
                Err(StepError::Failed(e)) => {
                    tracing::warn!(
                        branch_id = %branch_id,
                        iteration = session.conversation.iteration() + 1,
                        error = %e,
                        "Refiner failed; keeping last completed variation"
                    );
                    break StoppedReason::RefinerFailed;
                }
                Err(StepError::Domain(e)) => return Err(e.into()),
            }
        };

        let final_score = session
            .iterations
            .last()
            .map(|i| i.quality_score)
            .unwrap_or_else(|| quality_score(&session.variation, context));
        tracing::info!(
            branch_id = %branch_id,
            stopped_reason = %reason,
            iterations = session.iterations.len(),
            final_score,
            "Refinement stopped"
        );

        Ok(RefinementResult {
            variation: session.variation.clone(),
            iterations: session.iterations.clone(),
            stopped_reason: reason,
            final_score,
        })
    }

    fn stop_reason(
        &self,
        session: &RefinementSession,
        cancel: &CancellationToken,
    ) -> Option<StoppedReason> {
        if cancel.is_cancelled() {
            return Some(StoppedReason::Cancelled);
        }
        let satisfied = match session.conversation.explicit_satisfaction() {
            Some(explicit) => explicit,
            None => {
                inferred_satisfaction(&session.conversation) >= self.options.satisfaction_threshold
            }
        };
        if satisfied {
            return Some(StoppedReason::UserSatisfied);
        }
        if session.conversation.iteration() >= self.options.iteration_cap() {
            return Some(StoppedReason::MaxIterations);
        }
        if self.options.stop_on_diminishing_returns && session.iterations.len() >= 2 {
            let stalled = session
                .iterations
                .last()
                .and_then(|i| i.improvement)
                .is_some_and(|gain| gain < self.options.min_improvement_threshold);
            if stalled {
                return Some(StoppedReason::DiminishingReturns);
            }
        }
        None
    }

    async fn run_iteration(
        &self,
        session: &mut RefinementSession,
        context: &ContextPackage,
        call: &ProseCall<'_>,
    ) -> Result<(), StepError> {
        let number = session.conversation.iteration() + 1;
        let critiques = critique(&session.variation, context);
        let already_addressed = session.addressed_kinds();
        let instructions = session.conversation.pending_instructions().to_vec();

        let mut working = session.variation.clone();
        let mut changes = Vec::new();
        let mut refined: BTreeSet<RefinementArea> = BTreeSet::new();

        // Instructions first
        for instruction in &instructions {
            for area in areas_for(&instruction.text) {
                let step = refine_area(area, &working, context, &instruction.text, call).await?;
                working = step.variation;
                changes.extend(step.changes);
                refined.insert(area);
            }
        }

        // Then critiques, highest priority first, within the change budget
        let budget = self
            .options
            .max_changes_per_iteration
            .saturating_sub(refined.len());
        let mut spent = 0;
        let mut addressed = Vec::new();
        for item in critiques
            .iter()
            .filter(|c| !already_addressed.contains(&c.kind))
        {
            if !refined.contains(&item.area) {
                if spent >= budget {
                    continue;
                }
                let step = refine_area(item.area, &working, context, &item.message, call).await?;
                working = step.variation;
                changes.extend(step.changes);
                refined.insert(item.area);
                spent += 1;
            }
            addressed.push(item.kind);
        }

        let score = quality_score(&working, context);
        let improvement = session.iterations.last().map(|p| score - p.quality_score);

        // Commit
        for instruction in &instructions {
            session
                .conversation
                .resolve_instruction(instruction.message_id)?;
        }
        session.conversation.complete_iteration();
        session.conversation.add_system_question(
            MessageId::from_uuid(self.random.gen_uuid()),
            format!(
                "Iteration {}: {} change(s), quality {:.2}. Anything else to adjust?",
                number,
                changes.len(),
                score
            ),
            self.clock.now(),
        );
        tracing::info!(
            branch_id = %working.id,
            iteration = number,
            score,
            improvement = improvement.unwrap_or_default(),
            changes = changes.len(),
            addressed = addressed.len(),
            "Refinement iteration complete"
        );

        session.iterations.push(RefinementIteration {
            number,
            critiques,
            addressed,
            changes,
            quality_score: score,
            improvement,
            variation: working.clone(),
        });
        session.variation = working;
        Ok(())
    }
}
