//! Shared types used across Delegator modules
//!
//! Contains message structures, tool call payloads, and tool definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{DelegatorError, Result};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Agent instructions, prepended to each model request
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message (may be empty)
    #[serde(default)]
    pub content: String,
    /// Tool calls requested by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Id of the call a tool message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool a tool message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    /// Create an assistant message requesting tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Create a tool message answering a call
    pub fn tool(result: &ToolCallResult) -> Self {
        Self {
            tool_call_id: Some(result.call_id.clone()),
            name: Some(result.tool_name.clone()),
            ..Self::plain(Role::Tool, result.output.clone())
        }
    }

    /// Requested tool calls, empty when there are none
    pub fn requested_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }

    /// Whether this message asks for any tool to run
    pub fn has_tool_calls(&self) -> bool {
        !self.requested_calls().is_empty()
    }
}

/// Arguments as sent by the model: JSON text or an already structured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawArguments {
    Text(String),
    Structured(Value),
}

impl RawArguments {
    /// Parse into a keyword map. Empty text counts as no arguments.
    pub fn parse(&self, tool: &str) -> Result<Map<String, Value>> {
        let value = match self {
            RawArguments::Text(text) if text.trim().is_empty() => return Ok(Map::new()),
            RawArguments::Text(text) => serde_json::from_str::<Value>(text).map_err(|e| {
                DelegatorError::invalid_arguments(tool, format!("malformed JSON: {}", e))
            })?,
            RawArguments::Structured(value) => value.clone(),
        };

        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(DelegatorError::invalid_arguments(
                tool,
                format!("expected a JSON object, got {}", other),
            )),
        }
    }

    /// Serialized text form, as required on the wire
    pub fn to_text(&self) -> String {
        match self {
            RawArguments::Text(text) => text.clone(),
            RawArguments::Structured(value) => value.to_string(),
        }
    }
}

impl From<Value> for RawArguments {
    fn from(value: Value) -> Self {
        RawArguments::Structured(value)
    }
}

impl From<&str> for RawArguments {
    fn from(text: &str) -> Self {
        RawArguments::Text(text.to_string())
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// Arguments for the tool
    pub arguments: RawArguments,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<RawArguments>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Outcome of dispatching one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    /// Id of the call this answers
    pub call_id: String,
    /// Name of the tool that was dispatched
    pub tool_name: String,
    /// Whether the tool completed without error
    pub success: bool,
    /// Stringified result or error description
    pub output: String,
}

impl ToolCallResult {
    /// Create a successful result
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success: true,
            output: output.into(),
        }
    }

    /// Create a failed result
    pub fn failure(call: &ToolCall, error: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success: false,
            output: error.into(),
        }
    }
}

/// Definition of a tool that can be called by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Name of the described function
    pub fn name(&self) -> &str {
        &self.function.name
    }
}
