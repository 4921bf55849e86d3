//! Delegator - tool-calling agents that delegate to sub-agents
//!
//! An agent sends its conversation to an OpenAI-compatible model, runs the
//! tool calls the model asks for concurrently, and loops until the model
//! answers. One of the tools, `task`, spawns a sub-agent with its own prompt
//! and a subset of the caller's tools.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model client abstraction with an OpenAI-compatible implementation
//! - **Tools**: Schema derivation, the tool registry, concurrent dispatch, built-ins
//! - **Agent**: Conversation loop and the sub-agent spawner
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use delegator::llm::OpenAiClient;
//! use delegator::tools::default_registry;
//! use delegator::{Agent, Config};
//!
//! #[tokio::main]
//! async fn main() -> delegator::Result<()> {
//!     let config = Config::load()?;
//!     let registry = Arc::new(default_registry(&config)?);
//!     let client = Arc::new(OpenAiClient::from_config(&config)?);
//!
//!     let answer = Agent::from_config(&config, registry, client)?
//!         .execute("What is 2 + 3?")
//!         .await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentOutcome};
pub use cli::Repl;
pub use core::{Config, DelegatorError, Result};
pub use llm::ModelClient;
pub use tools::{default_registry, ToolRegistry};
