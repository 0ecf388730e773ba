//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. Callers log them or map them onto their own events.

pub mod branch_events;

pub use branch_events::BranchRecordUpdate;
