//! RefinementConversation aggregate - the message log behind a refinement session
//!
//! The log is append-only. The only in-place change is moving an instruction
//! from `pending` to `resolved` once a refiner has acted on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{BranchId, MessageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// A change the user wants made
    UserInstruction,
    /// A reaction to the current state, optionally carrying a satisfaction signal
    UserFeedback,
    /// A question or summary posted by the loop after an iteration
    SystemQuestion,
    /// The user accepting the last round of changes
    RefinementConfirmation,
}

impl MessageKind {
    pub fn is_user(&self) -> bool {
        !matches!(self, MessageKind::SystemQuestion)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: MessageId,
    pub kind: MessageKind,
    pub content: String,
    /// Iteration counter at the time the message was appended
    pub iteration: u32,
    /// Explicit satisfaction signal, feedback messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfied: Option<bool>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub message_id: MessageId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementConversation {
    branch_id: BranchId,
    messages: Vec<ConversationMessage>,
    iteration: u32,
    pending_instructions: Vec<Instruction>,
    resolved_instructions: Vec<Instruction>,
}

impl RefinementConversation {
    pub fn new(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            messages: Vec::new(),
            iteration: 0,
            pending_instructions: Vec::new(),
            resolved_instructions: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    #[inline]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Completed iterations.
    #[inline]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    #[inline]
    pub fn pending_instructions(&self) -> &[Instruction] {
        &self.pending_instructions
    }

    #[inline]
    pub fn resolved_instructions(&self) -> &[Instruction] {
        &self.resolved_instructions
    }

    /// Most recent explicit satisfaction signal from the user, if any.
    pub fn explicit_satisfaction(&self) -> Option<bool> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::UserFeedback && m.satisfied.is_some())
            .and_then(|m| m.satisfied)
    }

    /// True when the latest user message accepts the last round of changes.
    pub fn last_user_message_confirms(&self) -> bool {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind.is_user())
            .is_some_and(|m| m.kind == MessageKind::RefinementConfirmation)
    }

    /// The last `n` user-authored messages, oldest first.
    pub fn recent_user_messages(&self, n: usize) -> Vec<&ConversationMessage> {
        let mut recent: Vec<&ConversationMessage> = self
            .messages
            .iter()
            .rev()
            .filter(|m| m.kind.is_user())
            .take(n)
            .collect();
        recent.reverse();
        recent
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add_instruction(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<MessageId, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("Instruction cannot be empty"));
        }
        self.pending_instructions.push(Instruction {
            message_id: id,
            text: text.clone(),
        });
        self.push(id, MessageKind::UserInstruction, text, None, now);
        Ok(id)
    }

    pub fn add_feedback(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
        satisfied: Option<bool>,
        now: DateTime<Utc>,
    ) -> MessageId {
        self.push(id, MessageKind::UserFeedback, text.into(), satisfied, now);
        id
    }

    pub fn add_system_question(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> MessageId {
        self.push(id, MessageKind::SystemQuestion, text.into(), None, now);
        id
    }

    pub fn add_confirmation(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> MessageId {
        self.push(id, MessageKind::RefinementConfirmation, text.into(), None, now);
        id
    }

    /// Move a pending instruction to `resolved`.
    pub fn resolve_instruction(&mut self, message_id: MessageId) -> Result<(), DomainError> {
        let index = self
            .pending_instructions
            .iter()
            .position(|i| i.message_id == message_id)
            .ok_or_else(|| DomainError::not_found("PendingInstruction", message_id.to_string()))?;
        let instruction = self.pending_instructions.remove(index);
        self.resolved_instructions.push(instruction);
        Ok(())
    }

    /// Mark one more iteration as completed and return the new count.
    pub fn complete_iteration(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    fn push(
        &mut self,
        id: MessageId,
        kind: MessageKind,
        content: String,
        satisfied: Option<bool>,
        now: DateTime<Utc>,
    ) {
        self.messages.push(ConversationMessage {
            id,
            kind,
            content,
            iteration: self.iteration,
            satisfied,
            created_at: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_instruction_moves_from_pending_to_resolved() {
        let mut conversation = RefinementConversation::new(BranchId::new());
        let id = conversation
            .add_instruction(MessageId::new(), "Deepen Mara's arc", now())
            .unwrap();
        assert_eq!(conversation.pending_instructions().len(), 1);

        conversation.resolve_instruction(id).unwrap();

        assert!(conversation.pending_instructions().is_empty());
        assert_eq!(conversation.resolved_instructions()[0].text, "Deepen Mara's arc");
        assert_eq!(conversation.messages().len(), 1);
    }

    #[test]
    fn test_empty_instruction_is_rejected() {
        let mut conversation = RefinementConversation::new(BranchId::new());
        assert!(conversation.add_instruction(MessageId::new(), "  ", now()).is_err());
        assert!(conversation.messages().is_empty());
    }

    #[test]
    fn test_explicit_satisfaction_uses_latest_signal() {
        let mut conversation = RefinementConversation::new(BranchId::new());
        conversation.add_feedback(MessageId::new(), "Not yet", Some(false), now());
        conversation.add_feedback(MessageId::new(), "Hmm", None, now());
        assert_eq!(conversation.explicit_satisfaction(), Some(false));
        conversation.add_feedback(MessageId::new(), "Perfect", Some(true), now());
        assert_eq!(conversation.explicit_satisfaction(), Some(true));
    }

    #[test]
    fn test_confirmation_ignores_system_messages() {
        let mut conversation = RefinementConversation::new(BranchId::new());
        conversation.add_confirmation(MessageId::new(), "Keep those changes", now());
        conversation.add_system_question(MessageId::new(), "Anything else?", now());
        assert!(conversation.last_user_message_confirms());
    }

    #[test]
    fn test_messages_carry_iteration_number() {
        let mut conversation = RefinementConversation::new(BranchId::new());
        conversation.complete_iteration();
        conversation.add_feedback(MessageId::new(), "Better", None, now());
        assert_eq!(conversation.messages()[0].iteration, 1);
    }
}
