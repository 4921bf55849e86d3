//! Model client trait for abstracting different backends
//!
//! The conversation loop only ever talks to this trait, so tests can script
//! responses and real runs can point at any OpenAI-compatible endpoint.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolDefinition};

/// Stateless request/response boundary to a language model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the full history plus tool schemas and get one assistant message back.
    ///
    /// Errors are fatal to the calling loop turn; retries, if any, belong to
    /// the implementation.
    async fn create(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message>;

    /// Get the provider name
    fn name(&self) -> &str;
}
