//! Sub-agent support
//!
//! The `task` tool. A model calls it to hand a self-contained piece of work to
//! a fresh agent with its own prompt and a narrower set of tools; the child's
//! final answer comes back as the tool result.

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use tracing::info;

use crate::agent::orchestrator::Agent;
use crate::core::{DelegatorError, Result};
use crate::tools::{Capability, ToolArgs, ToolContext, ToolHandler, ToolRegistry, ToolSignature};

/// Name the spawner is registered under
pub const TASK_TOOL: &str = "task";

/// One delegation, as requested by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRequest {
    /// System prompt for the sub-agent
    pub prompt: String,
    /// Tools the sub-agent may use (empty = everything the caller has)
    pub tools: Vec<String>,
    /// Task handed to the sub-agent as its user message
    pub user_input: String,
}

impl DelegationRequest {
    pub fn from_args(args: &ToolArgs) -> anyhow::Result<Self> {
        Ok(Self {
            prompt: args.get_str("prompt")?.to_string(),
            tools: args.get_string_list("tools")?,
            user_input: args.get_str("user_input")?.to_string(),
        })
    }
}

/// Tool handler that spawns sub-agents
#[derive(Debug, Clone, Copy, Default)]
pub struct SubAgentSpawner;

impl SubAgentSpawner {
    /// Declared signature of the `task` tool
    pub fn signature() -> ToolSignature {
        ToolSignature::new(TASK_TOOL)
            .doc(
                "Delegate a self-contained task to a sub-agent and return its final answer.\n\
                 \n\
                 * `prompt` - System prompt describing the sub-agent's role\n\
                 * `tools` - Names of the tools the sub-agent may use\n\
                 * `user_input` - The task for the sub-agent to complete",
            )
            .param("prompt", "String")
            .param("tools", "Vec<String>")
            .param("user_input", "String")
    }

    /// Register the `task` tool
    pub fn register(registry: &mut ToolRegistry) -> Result<()> {
        registry.register_tool(&Self::signature(), Capability::handler(SubAgentSpawner))
    }
}

#[async_trait]
impl ToolHandler for SubAgentSpawner {
    async fn call(&self, args: ToolArgs, ctx: ToolContext) -> anyhow::Result<Value> {
        let request = DelegationRequest::from_args(&args)?;
        let answer = delegate(&ctx, request).await?;
        Ok(Value::String(answer))
    }
}

/// Run `request` in a sub-agent one level below the caller in `ctx`.
///
/// The sub-agent can only be given tools the caller has itself. It shares the
/// caller's model client and limits, and is dropped once it answers.
pub async fn delegate(ctx: &ToolContext, request: DelegationRequest) -> Result<String> {
    let tools = if request.tools.is_empty() {
        ctx.available_tools.to_vec()
    } else {
        ctx.registry.validate_subset(&request.tools)?;
        if let Some(denied) = request.tools.iter().find(|name| !ctx.can_use(name)) {
            return Err(DelegatorError::ToolNotAvailable(denied.clone()));
        }
        request.tools
    };

    let agent = Agent::builder(ctx.registry.clone(), ctx.client.clone())
        .system_prompt(request.prompt)
        .tools(tools)
        .depth(ctx.depth + 1)
        .limits(ctx.limits)
        .build()?;

    let id: u32 = rand::rng().random_range(1000..10000);
    info!(
        sub_agent = id,
        depth = agent.depth(),
        tools = ?agent.tools(),
        "Spawning sub-agent"
    );

    let answer = agent.execute(&request.user_input).await?;
    info!(sub_agent = id, chars = answer.len(), "Sub-agent finished");
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::core::config::Limits;
    use crate::core::{Message, Role, ToolDefinition};
    use crate::llm::ModelClient;

    /// Answers every request with a fixed message and keeps the requests
    struct Echo {
        requests: Mutex<Vec<(Vec<Message>, Vec<ToolDefinition>)>>,
    }

    #[async_trait]
    impl ModelClient for Echo {
        async fn create(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), tools.to_vec()));
            Ok(Message::assistant("child says hi"))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry
            .register_tool(
                &ToolSignature::new("calculator")
                    .param("a", "i64")
                    .param("b", "i64"),
                Capability::blocking(|args| Ok(json!(args.get_i64("a")? + args.get_i64("b")?))),
            )
            .unwrap();
        registry
            .register_tool(
                &ToolSignature::new("read_file").param("file_path", "String"),
                Capability::blocking(|_| Ok(Value::Null)),
            )
            .unwrap();
        SubAgentSpawner::register(&mut registry).unwrap();
        Arc::new(registry)
    }

    fn context(client: Arc<Echo>, available: &[&str], depth: usize) -> ToolContext {
        ToolContext {
            registry: registry(),
            client,
            available_tools: available.iter().map(|s| s.to_string()).collect(),
            depth,
            limits: Limits {
                max_turns: 5,
                max_depth: 2,
            },
        }
    }

    fn echo() -> Arc<Echo> {
        Arc::new(Echo {
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request(tools: &[&str]) -> DelegationRequest {
        DelegationRequest {
            prompt: "You add numbers.".to_string(),
            tools: tools.iter().map(|s| s.to_string()).collect(),
            user_input: "1+1".to_string(),
        }
    }

    #[test]
    fn test_task_schema() {
        let registry = registry();
        let task = registry.lookup(TASK_TOOL).unwrap();
        assert_eq!(task.required(), vec!["prompt", "tools", "user_input"]);
        assert_eq!(
            task.definition().function.parameters["properties"]["tools"]["type"],
            "array"
        );
    }

    #[tokio::test]
    async fn test_sub_agent_gets_prompt_and_subset() {
        let client = echo();
        let ctx = context(client.clone(), &["calculator", "read_file", "task"], 0);

        let answer = delegate(&ctx, request(&["calculator"])).await.unwrap();
        assert_eq!(answer, "child says hi");

        let requests = client.requests.lock().unwrap();
        let (messages, tools) = &requests[0];
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You add numbers.");
        assert_eq!(messages[1].content, "1+1");
        let offered: Vec<&str> = tools.iter().map(|d| d.name()).collect();
        assert_eq!(offered, vec!["calculator"]);
    }

    #[tokio::test]
    async fn test_empty_subset_inherits_caller_tools() {
        let client = echo();
        let ctx = context(client.clone(), &["read_file"], 0);

        delegate(&ctx, request(&[])).await.unwrap();
        let requests = client.requests.lock().unwrap();
        let offered: Vec<&str> = requests[0].1.iter().map(|d| d.name()).collect();
        assert_eq!(offered, vec!["read_file"]);
    }

    #[tokio::test]
    async fn test_cannot_escalate_privileges() {
        let ctx = context(echo(), &["calculator", "task"], 1);
        let err = delegate(&ctx, request(&["read_file"])).await.unwrap_err();
        assert!(matches!(err, DelegatorError::ToolNotAvailable(ref n) if n == "read_file"));

        let err = delegate(&ctx, request(&["web_search"])).await.unwrap_err();
        assert!(matches!(err, DelegatorError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let client = echo();
        let ctx = context(client.clone(), &["calculator", "task"], 2);

        let err = delegate(&ctx, request(&["calculator"])).await.unwrap_err();
        assert!(matches!(
            err,
            DelegatorError::DelegationDepthExceeded {
                depth: 3,
                max_depth: 2
            }
        ));
        assert!(client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handler_returns_answer_as_string() {
        let ctx = context(echo(), &["calculator", "task"], 0);
        let args = ToolArgs::new(
            TASK_TOOL,
            json!({"prompt": "p", "tools": ["calculator"], "user_input": "u"})
                .as_object()
                .unwrap()
                .clone(),
        );

        let value = SubAgentSpawner.call(args, ctx).await.unwrap();
        assert_eq!(value, Value::String("child says hi".to_string()));
    }
}
