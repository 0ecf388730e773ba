//! Hand-written `ProsePort` fakes for refinement tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::ports::{ProseError, ProsePort, ProseRequest};
use crate::infrastructure::prose::TemplateProse;

/// Never answers within any reasonable timeout.
pub struct SlowProse(pub Duration);

#[async_trait]
impl ProsePort for SlowProse {
    async fn rewrite(&self, request: ProseRequest) -> Result<String, ProseError> {
        tokio::time::sleep(self.0).await;
        Ok(request.current_text)
    }
}

/// Always fails.
pub struct FailingProse;

#[async_trait]
impl ProsePort for FailingProse {
    async fn rewrite(&self, _request: ProseRequest) -> Result<String, ProseError> {
        Err(ProseError::RequestFailed("backend unavailable".into()))
    }
}

/// Delegates to `TemplateProse` for the first `limit` calls, then fails.
pub struct FailAfterProse {
    limit: usize,
    calls: AtomicUsize,
}

impl FailAfterProse {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProsePort for FailAfterProse {
    async fn rewrite(&self, request: ProseRequest) -> Result<String, ProseError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Err(ProseError::InvalidResponse("empty completion".into()));
        }
        TemplateProse.rewrite(request).await
    }
}
