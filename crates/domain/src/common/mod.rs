//! Common utility functions shared across the validators and comparator.
//!
//! # Design Principles
//!
//! - **Pure functions only** - no side effects, no I/O
//! - **Deterministic** - identical input always yields identical output

pub mod text;

pub use text::{
    clamp_score, contains_ignore_case, jaccard, label_overlap, mean, sentences, tokenize,
    word_count,
};
