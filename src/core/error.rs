//! Custom error types for Delegator
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Delegator operations
#[derive(Error, Debug)]
pub enum DelegatorError {
    /// A tool with the same name is already registered
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    /// A tool parameter name was declared more than once
    #[error("Tool '{tool}': parameter '{param}' is declared more than once")]
    DuplicateParameter { tool: String, param: String },

    /// A tool parameter was declared without a type
    #[error("Tool '{tool}': parameter '{param}' has no declared type")]
    MissingParameterType { tool: String, param: String },

    /// A tool parameter was declared with a type that has no schema mapping
    #[error("Tool '{tool}': parameter '{param}' has unsupported type '{declared}'")]
    UnsupportedParameterType {
        tool: String,
        param: String,
        declared: String,
    },

    /// Tool name not present in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool exists but is outside the calling agent's tool subset
    #[error("Tool '{0}' is not available to this agent")]
    ToolNotAvailable(String),

    /// Tool arguments could not be parsed or did not match the schema
    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Sub-agent construction beyond the configured depth
    #[error("Delegation depth {depth} exceeds the maximum of {max_depth}")]
    DelegationDepthExceeded { depth: usize, max_depth: usize },

    /// Conversation loop ran out of turns before a final answer
    #[error("No final answer after {0} model turns")]
    MaxTurnsExceeded(usize),

    /// Model client transport or protocol errors
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for Delegator operations
pub type Result<T> = std::result::Result<T, DelegatorError>;

impl DelegatorError {
    /// Create a model client error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an argument error for a tool
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Whether this error is a registration-time configuration failure
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTool(_)
                | Self::DuplicateParameter { .. }
                | Self::MissingParameterType { .. }
                | Self::UnsupportedParameterType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_classification() {
        assert!(DelegatorError::DuplicateTool("calc".into()).is_registration());
        assert!(DelegatorError::DuplicateParameter {
            tool: "calc".into(),
            param: "a".into()
        }
        .is_registration());
        assert!(!DelegatorError::UnknownTool("calc".into()).is_registration());
        assert!(!DelegatorError::model("boom").is_registration());
    }

    #[test]
    fn test_messages() {
        let err = DelegatorError::DelegationDepthExceeded {
            depth: 4,
            max_depth: 3,
        };
        assert_eq!(
            err.to_string(),
            "Delegation depth 4 exceeds the maximum of 3"
        );

        let err = DelegatorError::invalid_arguments("calculator", "missing 'a'");
        assert_eq!(err.to_string(), "Invalid arguments for 'calculator': missing 'a'");
    }
}
