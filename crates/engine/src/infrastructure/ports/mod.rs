//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Branch persistence (could swap in-memory -> a database)
//! - Prose rewriting (could swap templates -> an LLM)
//! - Clock/Random (for testing and seeded generation)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{ProseError, RepoError};
pub use external::{ProsePort, ProseRequest};
pub use repos::BranchRepo;
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use repos::MockBranchRepo;
#[cfg(test)]
pub use testing::MockClockPort;
