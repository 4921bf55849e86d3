//! Tools module - tool registry, dispatch, and built-in tools
//!
//! Contains schema derivation, the registry, the concurrent dispatcher, and
//! the built-in calculator, shell and file tools.

pub mod builtin;
pub mod context;
pub mod dispatcher;
pub mod registry;
pub mod schema;

pub use context::{ToolArgs, ToolContext};
pub use dispatcher::{stringify_output, ToolDispatcher};
pub use registry::{Capability, ToolDescriptor, ToolHandler, ToolRegistry};
pub use schema::{derive_schema, DerivedSchema, ParamSpec, ParamType, ToolSignature};

use crate::agent::SubAgentSpawner;
use crate::core::{Config, Result};

/// Registry with the built-in tools and the `task` sub-agent spawner
pub fn default_registry(config: &Config) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    builtin::register_builtins(&mut registry, config)?;
    SubAgentSpawner::register(&mut registry)?;
    Ok(registry)
}
