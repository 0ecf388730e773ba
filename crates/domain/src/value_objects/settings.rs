//! Branching engine settings value object
//!
//! Settings carry serde derives so a host application can persist them and
//! hand them back as JSON. Every field has a serde default, so partial
//! documents deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::types::StrictnessLevel;
use crate::value_objects::RefinementOptions;

/// All configurable settings of the branching engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchSettings {
    // ============================================================================
    // Generation
    // ============================================================================

    /// Candidates requested when the caller does not say
    #[serde(default = "default_variation_count")]
    pub default_variation_count: usize,

    /// Seed for reproducible generation. `None` uses the thread rng.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,

    // ============================================================================
    // Refinement
    // ============================================================================

    /// Iteration cap, clamped to 1..=5 when read
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_true")]
    pub stop_on_diminishing_returns: bool,
    #[serde(default = "default_min_improvement_threshold")]
    pub min_improvement_threshold: f64,
    /// Inferred satisfaction at or above this ends the loop
    #[serde(default = "default_satisfaction_threshold")]
    pub satisfaction_threshold: f64,
    #[serde(default = "default_max_changes_per_iteration")]
    pub max_changes_per_iteration: usize,
    /// Upper bound on a single prose rewrite
    #[serde(default = "default_refiner_timeout_ms")]
    pub refiner_timeout_ms: u64,

    // ============================================================================
    // Prose retry
    // ============================================================================

    #[serde(default = "default_prose_max_retries")]
    pub prose_max_retries: u32,
    #[serde(default = "default_prose_base_delay_ms")]
    pub prose_base_delay_ms: u64,

    // ============================================================================
    // Review
    // ============================================================================

    #[serde(default)]
    pub default_strictness: StrictnessLevel,
}

fn default_variation_count() -> usize { 3 }
fn default_max_iterations() -> u32 { 3 }
fn default_true() -> bool { true }
fn default_min_improvement_threshold() -> f64 { 0.05 }
fn default_satisfaction_threshold() -> f64 { 0.8 }
fn default_max_changes_per_iteration() -> usize { 3 }
fn default_refiner_timeout_ms() -> u64 { 30_000 }
fn default_prose_max_retries() -> u32 { 2 }
fn default_prose_base_delay_ms() -> u64 { 250 }

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            default_variation_count: default_variation_count(),
            rng_seed: None,
            max_iterations: default_max_iterations(),
            stop_on_diminishing_returns: true,
            min_improvement_threshold: default_min_improvement_threshold(),
            satisfaction_threshold: default_satisfaction_threshold(),
            max_changes_per_iteration: default_max_changes_per_iteration(),
            refiner_timeout_ms: default_refiner_timeout_ms(),
            prose_max_retries: default_prose_max_retries(),
            prose_base_delay_ms: default_prose_base_delay_ms(),
            default_strictness: StrictnessLevel::default(),
        }
    }
}

impl BranchSettings {
    /// Load settings from `BRANCHWRIGHT_*` environment variables, falling back
    /// to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_variation_count: env_or("BRANCHWRIGHT_VARIATION_COUNT", defaults.default_variation_count),
            rng_seed: std::env::var("BRANCHWRIGHT_RNG_SEED").ok().and_then(|v| v.parse().ok()),
            max_iterations: env_or("BRANCHWRIGHT_MAX_ITERATIONS", defaults.max_iterations),
            stop_on_diminishing_returns: env_or("BRANCHWRIGHT_STOP_ON_DIMINISHING_RETURNS", defaults.stop_on_diminishing_returns),
            min_improvement_threshold: env_or("BRANCHWRIGHT_MIN_IMPROVEMENT", defaults.min_improvement_threshold),
            satisfaction_threshold: env_or("BRANCHWRIGHT_SATISFACTION_THRESHOLD", defaults.satisfaction_threshold),
            max_changes_per_iteration: env_or("BRANCHWRIGHT_MAX_CHANGES_PER_ITERATION", defaults.max_changes_per_iteration),
            refiner_timeout_ms: env_or("BRANCHWRIGHT_REFINER_TIMEOUT_MS", defaults.refiner_timeout_ms),
            prose_max_retries: env_or("BRANCHWRIGHT_PROSE_MAX_RETRIES", defaults.prose_max_retries),
            prose_base_delay_ms: env_or("BRANCHWRIGHT_PROSE_BASE_DELAY_MS", defaults.prose_base_delay_ms),
            default_strictness: env_or("BRANCHWRIGHT_STRICTNESS", defaults.default_strictness),
        }
    }

    /// Refinement loop options derived from these settings.
    pub fn refinement_options(&self) -> RefinementOptions {
        RefinementOptions {
            max_iterations: self
                .max_iterations
                .clamp(RefinementOptions::MIN_ITERATIONS, RefinementOptions::MAX_ITERATIONS),
            stop_on_diminishing_returns: self.stop_on_diminishing_returns,
            min_improvement_threshold: self.min_improvement_threshold,
            satisfaction_threshold: self.satisfaction_threshold,
            max_changes_per_iteration: self.max_changes_per_iteration,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BranchSettings::default();
        assert_eq!(settings.default_variation_count, 3);
        assert_eq!(settings.max_iterations, 3);
        assert!(settings.stop_on_diminishing_returns);
        assert_eq!(settings.min_improvement_threshold, 0.05);
        assert_eq!(settings.default_strictness, StrictnessLevel::Moderate);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: BranchSettings =
            serde_json::from_str(r#"{"maxIterations":5,"rngSeed":7}"#).unwrap();
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.rng_seed, Some(7));
        assert_eq!(settings.refiner_timeout_ms, 30_000);
    }

    #[test]
    fn test_refinement_options_clamp_iterations() {
        let settings = BranchSettings {
            max_iterations: 9,
            ..Default::default()
        };
        assert_eq!(settings.refinement_options().max_iterations, 5);
    }
}
