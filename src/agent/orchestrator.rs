//! Agent orchestrator
//!
//! One [`Agent`] handles one task. It sends its history to the model, runs
//! whatever tool calls come back (all of a turn's calls at once), appends the
//! results, and repeats until the model answers without asking for tools.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::AgentLoopState;
use crate::core::config::{Config, Limits};
use crate::core::{DelegatorError, Message, Result};
use crate::llm::ModelClient;
use crate::tools::{ToolContext, ToolDispatcher, ToolRegistry};

/// A single-use tool-calling agent
pub struct Agent {
    /// System prompt defining the agent's role
    system_prompt: String,
    /// Which tool names this agent can use
    tools: Arc<[String]>,
    /// Shared tool registry
    registry: Arc<ToolRegistry>,
    /// Model client
    client: Arc<dyn ModelClient>,
    /// Delegation depth (0 = top level)
    depth: usize,
    /// Turn and depth limits
    limits: Limits,
}

/// Builder for creating Agents
pub struct AgentBuilder {
    registry: Arc<ToolRegistry>,
    client: Arc<dyn ModelClient>,
    system_prompt: String,
    tools: Option<Vec<String>>,
    depth: usize,
    limits: Limits,
}

impl AgentBuilder {
    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Restrict the agent to these tools (default: every registered tool)
    pub fn tools(mut self, tools: Vec<String>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the delegation depth
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set turn and depth limits
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the Agent, checking depth and tool names
    pub fn build(self) -> Result<Agent> {
        if self.depth > self.limits.max_depth {
            return Err(DelegatorError::DelegationDepthExceeded {
                depth: self.depth,
                max_depth: self.limits.max_depth,
            });
        }

        let tools = match self.tools {
            Some(requested) => {
                self.registry.validate_subset(&requested)?;
                let mut unique: Vec<String> = Vec::with_capacity(requested.len());
                for name in requested {
                    if !unique.contains(&name) {
                        unique.push(name);
                    }
                }
                unique
            }
            None => self.registry.names(),
        };

        Ok(Agent {
            system_prompt: self.system_prompt,
            tools: tools.into(),
            registry: self.registry,
            client: self.client,
            depth: self.depth,
            limits: self.limits,
        })
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Content of the final assistant message
    pub answer: String,
    /// Full history, starting with the user message
    pub history: Vec<Message>,
    /// Model calls made
    pub turns: usize,
    /// Tool calls dispatched
    pub tool_calls: usize,
}

impl Agent {
    /// Create a builder for more control
    pub fn builder(registry: Arc<ToolRegistry>, client: Arc<dyn ModelClient>) -> AgentBuilder {
        AgentBuilder {
            registry,
            client,
            system_prompt: String::new(),
            tools: None,
            depth: 0,
            limits: Limits::default(),
        }
    }

    /// Top-level agent with the configured prompt, limits, and every tool
    pub fn from_config(
        config: &Config,
        registry: Arc<ToolRegistry>,
        client: Arc<dyn ModelClient>,
    ) -> Result<Self> {
        Self::builder(registry, client)
            .system_prompt(config.agent.system_prompt.clone())
            .limits(config.limits())
            .build()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Tool names this agent is offered
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run the task and return the final answer
    pub async fn execute(self, user_input: &str) -> Result<String> {
        Ok(self.run(user_input).await?.answer)
    }

    /// Run the task to completion.
    ///
    /// Model client errors end the run; tool errors are fed back to the model.
    /// Running out of turns is [`DelegatorError::MaxTurnsExceeded`].
    pub async fn run(self, user_input: &str) -> Result<AgentOutcome> {
        let definitions = self.registry.schema_for(&self.tools)?;
        let dispatcher = ToolDispatcher::new(ToolContext {
            registry: self.registry.clone(),
            client: self.client.clone(),
            available_tools: self.tools.clone(),
            depth: self.depth,
            limits: self.limits,
        });

        let mut conversation = Conversation::new(self.system_prompt.clone(), user_input);
        let mut state = AgentLoopState::new(self.limits.max_turns);

        info!(
            depth = self.depth,
            tools = self.tools.len(),
            max_turns = state.max_turns,
            "Agent started"
        );

        while state.should_continue() {
            state.next_turn();
            let response = self
                .client
                .create(&conversation.request_messages(), &definitions)
                .await?;

            let calls = response.requested_calls().to_vec();
            conversation.push_assistant(response);

            if calls.is_empty() {
                let answer = conversation
                    .last_assistant_message()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                state.finish(answer);
                break;
            }

            debug!(
                depth = self.depth,
                turn = state.turn,
                calls = calls.len(),
                "Executing tool calls"
            );

            let results = dispatcher.dispatch_all(&calls).await;
            state.record_tool_calls(results.len());
            conversation.push_tool_results(&results);
        }

        if state.exhausted() {
            warn!(depth = self.depth, turns = state.turn, "Agent ran out of turns");
            return Err(DelegatorError::MaxTurnsExceeded(state.max_turns));
        }

        info!(
            depth = self.depth,
            turns = state.turn,
            tool_calls = state.tool_calls,
            "Agent complete"
        );

        Ok(AgentOutcome {
            answer: state.final_answer.take().unwrap_or_default(),
            history: conversation.into_history(),
            turns: state.turn,
            tool_calls: state.tool_calls,
        })
    }
}
