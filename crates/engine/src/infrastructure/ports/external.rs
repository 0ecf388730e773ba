//! External service port traits.

use async_trait::async_trait;
use branchwright_domain::RefinementArea;

use super::error::ProseError;

/// One descriptive field to rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct ProseRequest {
    pub area: RefinementArea,
    /// Field path, e.g. `trajectory.climax`
    pub field: String,
    pub current_text: String,
    /// The critique or user instruction driving the rewrite
    pub guidance: String,
    /// Title of the branch, for context
    pub branch_title: String,
}

impl ProseRequest {
    pub fn new(
        area: RefinementArea,
        field: impl Into<String>,
        current_text: impl Into<String>,
        guidance: impl Into<String>,
        branch_title: impl Into<String>,
    ) -> Self {
        Self {
            area,
            field: field.into(),
            current_text: current_text.into(),
            guidance: guidance.into(),
            branch_title: branch_title.into(),
        }
    }
}

/// Text generation backing the refiners.
#[async_trait]
pub trait ProsePort: Send + Sync {
    /// Rewrite `request.current_text` for the given area. Returns the new text.
    async fn rewrite(&self, request: ProseRequest) -> Result<String, ProseError>;
}
