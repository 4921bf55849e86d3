//! Tool registry - descriptors for every tool an agent may be offered
//!
//! Built once during startup with explicit [`ToolRegistry::register`] calls,
//! then frozen behind an `Arc` and only read from.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::{DelegatorError, Result, ToolDefinition};
use crate::tools::context::{ToolArgs, ToolContext};
use crate::tools::schema::{derive_schema, DerivedSchema, ParamSpec, ToolSignature};

/// Asynchronous tool body
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool. The returned value is stringified for the model; errors
    /// become error text in the tool result.
    async fn call(&self, args: ToolArgs, ctx: ToolContext) -> anyhow::Result<Value>;
}

type BlockingFn = dyn Fn(ToolArgs) -> anyhow::Result<Value> + Send + Sync;
type BoxedFn = dyn Fn(ToolArgs) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;

/// The invocable part of a tool
#[derive(Clone)]
pub enum Capability {
    /// Runs on the async runtime
    Async(Arc<dyn ToolHandler>),
    /// Runs on the blocking thread pool
    Blocking(Arc<BlockingFn>),
}

impl Capability {
    /// Wrap a [`ToolHandler`]
    pub fn handler(handler: impl ToolHandler + 'static) -> Self {
        Capability::Async(Arc::new(handler))
    }

    /// Wrap an async closure that does not need the tool context
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let boxed: Box<BoxedFn> = Box::new(move |args| f(args).boxed());
        Capability::Async(Arc::new(FnHandler(boxed)))
    }

    /// Wrap a synchronous closure; it is moved off the async workers when called
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(ToolArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Capability::Blocking(Arc::new(f))
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Async(_) => f.write_str("Capability::Async"),
            Capability::Blocking(_) => f.write_str("Capability::Blocking"),
        }
    }
}

struct FnHandler(Box<BoxedFn>);

#[async_trait]
impl ToolHandler for FnHandler {
    async fn call(&self, args: ToolArgs, _ctx: ToolContext) -> anyhow::Result<Value> {
        (self.0)(args).await
    }
}

/// A registered tool: derived schema plus its capability
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    schema: DerivedSchema,
    definition: ToolDefinition,
    capability: Capability,
}

impl ToolDescriptor {
    /// Derive a descriptor from a declared signature
    pub fn new(signature: &ToolSignature, capability: Capability) -> Result<Self> {
        let schema = derive_schema(signature)?;
        let definition = schema.definition();
        Ok(Self {
            schema,
            definition,
            capability,
        })
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn description(&self) -> &str {
        &self.schema.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.schema.params
    }

    /// Required parameter names (all declared parameters)
    pub fn required(&self) -> Vec<&str> {
        self.schema.required()
    }

    /// Function schema offered to the model
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Check parsed keyword arguments against the declared parameters
    pub fn validate(&self, args: &Map<String, Value>) -> Result<()> {
        for param in &self.schema.params {
            let value = args.get(&param.name).ok_or_else(|| {
                DelegatorError::invalid_arguments(
                    self.name(),
                    format!("missing required parameter '{}'", param.name),
                )
            })?;

            if !param.param_type.accepts(value) {
                return Err(DelegatorError::invalid_arguments(
                    self.name(),
                    format!(
                        "parameter '{}' must be {}, got {}",
                        param.name, param.param_type, value
                    ),
                ));
            }
        }

        if let Some(extra) = args
            .keys()
            .find(|key| !self.schema.params.iter().any(|p| &p.name == *key))
        {
            return Err(DelegatorError::invalid_arguments(
                self.name(),
                format!("unexpected parameter '{}'", extra),
            ));
        }

        Ok(())
    }
}

/// Registry of available tools
#[derive(Debug, Default)]
pub struct ToolRegistry {
    /// Descriptors indexed by name
    tools: HashMap<String, ToolDescriptor>,
    /// Names in registration order
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. A name can only be registered once; the
    /// existing entry is kept and the new one rejected.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        if self.tools.contains_key(&name) {
            warn!(tool = %name, "Rejected duplicate tool registration");
            return Err(DelegatorError::DuplicateTool(name));
        }

        debug!(tool = %name, params = descriptor.params().len(), "Registered tool");
        self.order.push(name.clone());
        self.tools.insert(name, descriptor);
        Ok(())
    }

    /// Derive a descriptor from `signature` and register it
    pub fn register_tool(&mut self, signature: &ToolSignature, capability: Capability) -> Result<()> {
        self.register(ToolDescriptor::new(signature, capability)?)
    }

    /// Look up a descriptor by name
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool names in registration order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Schemas for a subset of tools, in the order requested
    pub fn schema_for(&self, names: &[String]) -> Result<Vec<ToolDefinition>> {
        names
            .iter()
            .map(|name| {
                self.lookup(name)
                    .map(|d| d.definition().clone())
                    .ok_or_else(|| DelegatorError::UnknownTool(name.clone()))
            })
            .collect()
    }

    /// Fail on the first name that is not registered
    pub fn validate_subset(&self, names: &[String]) -> Result<()> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(DelegatorError::UnknownTool(missing.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_signature(name: &str) -> ToolSignature {
        ToolSignature::new(name)
            .doc("Echo the text back.\n* `text` - text to echo")
            .param("text", "String")
    }

    fn echo() -> Capability {
        Capability::blocking(|args| Ok(Value::String(args.get_str("text")?.to_string())))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(&echo_signature("echo"), echo()).unwrap();

        let descriptor = registry.lookup("echo").unwrap();
        assert_eq!(descriptor.description(), "Echo the text back.");
        assert_eq!(descriptor.required(), vec!["text"]);
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(&echo_signature("echo"), echo()).unwrap();

        let second = ToolSignature::new("echo")
            .doc("Another echo.")
            .param("other", "i64");
        let err = registry.register_tool(&second, echo()).unwrap_err();
        assert!(matches!(err, DelegatorError::DuplicateTool(ref n) if n == "echo"));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("echo").unwrap().description(),
            "Echo the text back."
        );
    }

    #[test]
    fn test_untyped_parameter_fails_registration() {
        let mut registry = ToolRegistry::new();
        let sig = ToolSignature::new("calculator")
            .param("a", "i64")
            .untyped_param("b");
        let err = registry.register_tool(&sig, echo()).unwrap_err();
        assert!(err.is_registration());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_repeated_parameter_fails_registration() {
        let mut registry = ToolRegistry::new();
        let sig = ToolSignature::new("dup")
            .param("a", "i64")
            .param("a", "String");
        let err = registry.register_tool(&sig, echo()).unwrap_err();
        assert!(matches!(err, DelegatorError::DuplicateParameter { .. }));
        assert!(registry.lookup("dup").is_none());
    }

    #[test]
    fn test_schema_for_subset_order() {
        let mut registry = ToolRegistry::new();
        for name in ["a", "b", "c"] {
            registry.register_tool(&echo_signature(name), echo()).unwrap();
        }

        let defs = registry
            .schema_for(&["c".to_string(), "a".to_string()])
            .unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["c", "a"]);

        assert!(matches!(
            registry.schema_for(&["zzz".to_string()]),
            Err(DelegatorError::UnknownTool(_))
        ));
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_arguments() {
        let descriptor = ToolDescriptor::new(
            &ToolSignature::new("calculator")
                .param("a", "i64")
                .param("b", "i64"),
            echo(),
        )
        .unwrap();

        let ok = json!({"a": 1, "b": 2});
        assert!(descriptor.validate(ok.as_object().unwrap()).is_ok());

        let missing = json!({"a": 1});
        let err = descriptor.validate(missing.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'b'"));

        let wrong = json!({"a": 1, "b": "two"});
        let err = descriptor.validate(wrong.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("must be integer"));

        let extra = json!({"a": 1, "b": 2, "c": 3});
        let err = descriptor.validate(extra.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unexpected parameter 'c'"));
    }
}
