//! Use cases - story-branch workflows.
//!
//! Each module covers one step of the branch lifecycle. Validators and the
//! comparator are pure; refinement and branch persistence go through ports.

pub mod branches;
pub mod comparison;
pub mod generation;
pub mod pipeline;
pub mod refinement;
pub mod traits;
pub mod validation;
pub mod world_rules;

// Re-export main types
pub use branches::{BranchError, BranchUseCases};
pub use comparison::{BranchComparator, ComparisonError};
pub use generation::{GenerationError, VariationGenerator};
pub use pipeline::{BranchReview, ReviewPipeline};
pub use refinement::{RefinementError, RefinementLoop, RefinementRegistry, RefinementSession};
pub use traits::{DeviationController, TieredTraitValidator};
pub use validation::MultiDimensionalValidator;
pub use world_rules::{FixClassifier, FixWorkflowError, WorldRuleValidator};
