//! Branchwright Engine library.
//!
//! Generation, review, refinement and comparison of story branches.
//!
//! ## Structure
//!
//! - `use_cases/` - Branch workflows: generate, validate, fix, refine, compare, select
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Shared fixtures for in-crate tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
