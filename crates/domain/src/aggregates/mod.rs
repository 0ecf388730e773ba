//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Keeps its fields private and exposes behavior through methods
//! - Guards its own invariants and returns a `DomainError` when a mutation
//!   would break them

pub mod branch_record;
pub mod fix_workflow;
pub mod refinement_conversation;

pub use branch_record::{BlockingIssue, BlockingSource, BranchRecord, BranchRecordPatch, BranchStatus};
pub use fix_workflow::{
    FixIssue, FixPatch, FixType, FixWorkflow, IssueSource, IssueStatus, PatchTarget,
    WorkflowStatus,
};
pub use refinement_conversation::{
    ConversationMessage, Instruction, MessageKind, RefinementConversation,
};
