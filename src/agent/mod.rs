//! Agent module - orchestration and conversation management
//!
//! Contains the conversation loop that coordinates model calls and tool
//! execution, and the `task` tool that spawns sub-agents.

pub mod conversation;
pub mod loop_state;
pub mod orchestrator;
pub mod sub_agent;

pub use conversation::Conversation;
pub use loop_state::{AgentLoopState, LoopPhase};
pub use orchestrator::{Agent, AgentBuilder, AgentOutcome};
pub use sub_agent::{delegate, DelegationRequest, SubAgentSpawner, TASK_TOOL};
