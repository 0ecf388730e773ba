//! # Branchwright Domain Types
//!
//! Closed vocabulary enums shared by every validator and the comparator.
//!
//! ## Design Principles
//!
//! 1. **Pure data types** - No I/O, no async, no side effects
//! 2. **Closed dispatch** - Lookups are `match` arms, never string-keyed maps
//! 3. **Serializable** - All types derive Serialize/Deserialize

// Anchor types
mod anchor;
pub use anchor::{NarrativeType, Significance};

// Branch shape types
mod story;
pub use story::{BranchMood, Complexity, ConsequenceScope, EndingType, GrowthType};

// Review types
mod review;
pub use review::{Importance, Severity, StrictnessLevel, TraitKind, TraitTier};
