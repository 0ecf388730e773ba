//! Infrastructure implementations.
//!
//! Contains port traits and their adapters for external dependencies.

pub mod clock;
pub mod memory_branch_repo;
pub mod ports;
pub mod prose;
pub mod resilient_prose;
