//! Resilient prose wrapper with exponential backoff retry
//!
//! Wraps any `ProsePort` so transient backend failures do not end a
//! refinement iteration on their first occurrence.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use branchwright_domain::BranchSettings;

use crate::infrastructure::ports::{ProseError, ProsePort, ProseRequest};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 250,
            max_delay_ms: 5000,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &BranchSettings) -> Self {
        Self {
            max_retries: settings.prose_max_retries,
            base_delay_ms: settings.prose_base_delay_ms,
            ..Self::default()
        }
    }
}

/// Wrapper that adds retry logic to any prose backend
pub struct ResilientProse {
    inner: Arc<dyn ProsePort>,
    config: RetryConfig,
}

impl ResilientProse {
    pub fn new(inner: Arc<dyn ProsePort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Delay for a given attempt number: exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    fn is_retryable(error: &ProseError) -> bool {
        match error {
            ProseError::RequestFailed(_) | ProseError::InvalidResponse(_) => true,
            ProseError::Rejected(_) => false,
            // The caller owns the time budget
            ProseError::Timeout(_) => false,
        }
    }
}

#[async_trait]
impl ProsePort for ResilientProse {
    async fn rewrite(&self, request: ProseRequest) -> Result<String, ProseError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.inner.rewrite(request.clone()).await {
                Ok(text) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            area = %request.area,
                            "Prose rewrite succeeded after retry"
                        );
                    }
                    return Ok(text);
                }
                Err(e) => {
                    if !Self::is_retryable(&e) {
                        tracing::error!(error = %e, area = %request.area, "Prose rewrite failed with non-retryable error");
                        return Err(e);
                    }
                    if attempt < self.config.max_retries {
                        let delay = self.calculate_delay(attempt + 1);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.config.max_retries,
                            delay_ms = delay,
                            error = %e,
                            "Prose rewrite failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| ProseError::RequestFailed("no attempt was made".to_string()));
        tracing::error!(
            attempts = self.config.max_retries + 1,
            error = %error,
            "Prose rewrite failed after all retry attempts"
        );
        Err(error)
    }
}
