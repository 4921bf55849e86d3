//! Conversation history management
//!
//! History is append-only: messages are never rewritten or dropped.

use crate::core::{Message, Role, ToolCallResult};

/// Owns the message history of one agent
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Message history, starting with the user's input
    messages: Vec<Message>,
    /// System prompt (sent first, never stored in history)
    system_prompt: String,
}

impl Conversation {
    /// Start a conversation from the user's input
    pub fn new(system_prompt: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(user_input)],
            system_prompt: system_prompt.into(),
        }
    }

    /// Append a model response
    pub fn push_assistant(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append one tool message per result, in the order given
    pub fn push_tool_results(&mut self, results: &[ToolCallResult]) {
        self.messages.extend(results.iter().map(Message::tool));
    }

    /// Messages for a model request: system prompt first, then history
    pub fn request_messages(&self) -> Vec<Message> {
        let mut result = Vec::with_capacity(self.messages.len() + 1);
        if !self.system_prompt.is_empty() {
            result.push(Message::system(self.system_prompt.clone()));
        }
        result.extend(self.messages.iter().cloned());
        result
    }

    /// History without the system prompt
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: a conversation starts with the user message
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Take the history out
    pub fn into_history(self) -> Vec<Message> {
        self.messages
    }
}
