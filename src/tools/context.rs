//! Per-dispatch context and argument access for tool handlers
//!
//! Handlers never hold on to the registry or the model client; they receive
//! both through [`ToolContext`] on every call. That is what lets the `task`
//! tool live inside the registry it delegates over.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

use crate::core::config::Limits;
use crate::llm::ModelClient;
use crate::tools::registry::ToolRegistry;

/// Everything a tool call can see about the agent that issued it
#[derive(Clone)]
pub struct ToolContext {
    /// Shared, read-only registry
    pub registry: Arc<ToolRegistry>,
    /// Model client of the calling agent
    pub client: Arc<dyn ModelClient>,
    /// Tool names the calling agent may use
    pub available_tools: Arc<[String]>,
    /// Delegation depth of the calling agent (0 = top level)
    pub depth: usize,
    /// Turn and depth limits inherited by sub-agents
    pub limits: Limits,
}

impl ToolContext {
    /// Whether the calling agent may use the named tool
    pub fn can_use(&self, name: &str) -> bool {
        self.available_tools.iter().any(|t| t == name)
    }
}

/// Keyword arguments of a single tool call, already validated against the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArgs {
    tool: String,
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(tool: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            values,
        }
    }

    /// Raw argument value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string argument
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| anyhow!("{}: '{}' must be a string", self.tool, key))
    }

    /// Get an integer argument; integral floats such as `2.0` are accepted
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        let value = self.require(key)?;
        value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| anyhow!("{}: '{}' must be an integer", self.tool, key))
    }

    /// Get a boolean argument
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| anyhow!("{}: '{}' must be a boolean", self.tool, key))
    }

    /// Get an array of strings
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| anyhow!("{}: '{}' must be an array", self.tool, key))?
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("{}: '{}' must only contain strings", self.tool, key))
            })
            .collect()
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| anyhow!("{}: missing argument '{}'", self.tool, key))
    }
}
