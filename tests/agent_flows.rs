//! End-to-end agent tests
//!
//! A rule-based model client stands in for the endpoint. It looks at the
//! system prompt and the last message to decide what to say, so parent and
//! sub-agents can share it the way they share a real client.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::timeout;

use delegator::core::config::Limits;
use delegator::core::{Message, Role, ToolCall, ToolDefinition};
use delegator::{default_registry, Agent, Config, DelegatorError, ModelClient, Result, ToolRegistry};

type Rule = dyn Fn(&[Message]) -> Result<Message> + Send + Sync;

/// A model request as seen by the client
struct Request {
    system_prompt: Option<String>,
    tools: Vec<String>,
}

struct RuleModel {
    rule: Box<Rule>,
    requests: Mutex<Vec<Request>>,
}

impl RuleModel {
    fn new(rule: impl Fn(&[Message]) -> Result<Message> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            rule: Box::new(rule),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Tool names offered on each request made under `system_prompt`
    fn offered(&self, system_prompt: &str) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.system_prompt.as_deref() == Some(system_prompt))
            .map(|r| r.tools.clone())
            .collect()
    }
}

#[async_trait]
impl ModelClient for RuleModel {
    async fn create(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
        self.requests.lock().unwrap().push(Request {
            system_prompt: messages
                .first()
                .filter(|m| m.role == Role::System)
                .map(|m| m.content.clone()),
            tools: tools.iter().map(|t| t.name().to_string()).collect(),
        });
        (self.rule)(messages)
    }

    fn name(&self) -> &str {
        "rules"
    }
}

const PARENT_PROMPT: &str = "You coordinate work.";
const ADDER_PROMPT: &str = "You add numbers.";

fn system_prompt(messages: &[Message]) -> &str {
    messages
        .first()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

fn last(messages: &[Message]) -> &Message {
    messages.last().expect("request has messages")
}

fn registry() -> Arc<ToolRegistry> {
    Arc::new(default_registry(&Config::default()).unwrap())
}

fn limits(max_turns: usize, max_depth: usize) -> Limits {
    Limits {
        max_turns,
        max_depth,
    }
}

/// Sub-agent behaviour: add the two numbers in "x+y" with the calculator
fn adder(messages: &[Message]) -> Result<Message> {
    let message = last(messages);
    match message.role {
        Role::User => {
            let (a, b) = message
                .content
                .split_once('+')
                .ok_or_else(|| DelegatorError::model("expected x+y"))?;
            let args = json!({"a": a.trim().parse::<i64>().unwrap(), "b": b.trim().parse::<i64>().unwrap()});
            Ok(Message::assistant_with_tools(
                "",
                vec![ToolCall::new("add_1", "calculator", args.to_string().as_str())],
            ))
        }
        _ => Ok(Message::assistant(message.content.clone())),
    }
}

fn delegate_call(id: &str, user_input: &str, tools: &[&str]) -> ToolCall {
    ToolCall::new(
        id,
        "task",
        json!({"prompt": ADDER_PROMPT, "tools": tools, "user_input": user_input}),
    )
}

#[tokio::test]
async fn test_calculator_end_to_end() {
    let model = RuleModel::new(|messages| {
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![ToolCall::new("call_1", "calculator", r#"{"a": 2, "b": 3}"#)],
            )),
            _ => Ok(Message::assistant(format!("2 + 3 = {}", message.content))),
        }
    });

    let outcome = Agent::builder(registry(), model.clone())
        .system_prompt(PARENT_PROMPT)
        .build()
        .unwrap()
        .run("2+3")
        .await
        .unwrap();

    assert_eq!(outcome.answer, "2 + 3 = 5");
    assert_eq!(outcome.turns, 2);

    let tool_message = &outcome.history[2];
    assert_eq!(tool_message.role, Role::Tool);
    assert_eq!(tool_message.content, "5");
    assert_eq!(tool_message.name.as_deref(), Some("calculator"));
}

#[tokio::test]
async fn test_delegation_end_to_end() {
    let model = RuleModel::new(|messages| {
        if system_prompt(messages) == ADDER_PROMPT {
            return adder(messages);
        }
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![delegate_call("call_1", "1+1", &["calculator"])],
            )),
            _ => Ok(Message::assistant(message.content.clone())),
        }
    });

    let registry = registry();
    let agent = Agent::builder(registry.clone(), model.clone())
        .system_prompt(PARENT_PROMPT)
        .build()
        .unwrap();
    assert_eq!(agent.tools().len(), registry.len());

    let answer = agent.execute("What is 1+1?").await.unwrap();
    assert_eq!(answer, "2");

    for offered in model.offered(ADDER_PROMPT) {
        assert_eq!(offered, vec!["calculator"]);
    }
    for offered in model.offered(PARENT_PROMPT) {
        assert_eq!(offered, registry.names());
    }
    assert_eq!(model.offered(ADDER_PROMPT).len(), 2);
}

#[tokio::test]
async fn test_parallel_delegations_keep_order() {
    let model = RuleModel::new(|messages| {
        if system_prompt(messages) == ADDER_PROMPT {
            return adder(messages);
        }
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![
                    delegate_call("first", "10+5", &["calculator"]),
                    delegate_call("second", "1+1", &["calculator"]),
                    delegate_call("third", "100+200", &["calculator"]),
                ],
            )),
            _ => {
                let results: Vec<String> = messages
                    .iter()
                    .filter(|m| m.role == Role::Tool)
                    .map(|m| format!("{}={}", m.tool_call_id.clone().unwrap_or_default(), m.content))
                    .collect();
                Ok(Message::assistant(results.join(",")))
            }
        }
    });

    let answer = timeout(
        Duration::from_secs(10),
        Agent::builder(registry(), model)
            .system_prompt(PARENT_PROMPT)
            .build()
            .unwrap()
            .execute("three sums"),
    )
    .await
    .expect("agent timed out")
    .unwrap();

    assert_eq!(answer, "first=15,second=2,third=300");
}

#[tokio::test]
async fn test_depth_limit_is_reported_to_model() {
    let model = RuleModel::new(|messages| {
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![delegate_call("call_1", "1+1", &["calculator"])],
            )),
            _ => Ok(Message::assistant(message.content.clone())),
        }
    });

    let answer = Agent::builder(registry(), model.clone())
        .system_prompt(PARENT_PROMPT)
        .limits(limits(5, 0))
        .build()
        .unwrap()
        .execute("1+1")
        .await
        .unwrap();

    assert!(answer.starts_with("Error: "));
    assert!(answer.contains("Delegation depth 1 exceeds the maximum of 0"));
    assert!(model.offered(ADDER_PROMPT).is_empty());
}

#[tokio::test]
async fn test_sub_agent_cannot_gain_tools() {
    let model = RuleModel::new(|messages| {
        if system_prompt(messages) == ADDER_PROMPT {
            return adder(messages);
        }
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![delegate_call("call_1", "1+1", &["calculator", "cmd"])],
            )),
            _ => Ok(Message::assistant(message.content.clone())),
        }
    });

    let answer = Agent::builder(registry(), model)
        .system_prompt(PARENT_PROMPT)
        .tools(vec!["calculator".to_string(), "task".to_string()])
        .build()
        .unwrap()
        .execute("1+1")
        .await
        .unwrap();

    assert!(answer.contains("Tool 'cmd' is not available to this agent"));
}

#[tokio::test]
async fn test_sub_agent_model_error_is_a_tool_result() {
    let model = RuleModel::new(|messages| {
        if system_prompt(messages) == ADDER_PROMPT {
            return Err(DelegatorError::model("endpoint unavailable"));
        }
        let message = last(messages);
        match message.role {
            Role::User => Ok(Message::assistant_with_tools(
                "",
                vec![delegate_call("call_1", "1+1", &["calculator"])],
            )),
            _ => Ok(Message::assistant(format!("child failed: {}", message.content))),
        }
    });

    let answer = Agent::builder(registry(), model)
        .system_prompt(PARENT_PROMPT)
        .build()
        .unwrap()
        .execute("1+1")
        .await
        .unwrap();

    assert!(answer.contains("Model error: endpoint unavailable"));
}

#[tokio::test]
async fn test_top_level_model_error_propagates() {
    let model = RuleModel::new(|_| Err(DelegatorError::model("401 Unauthorized")));

    let err = Agent::builder(registry(), model)
        .build()
        .unwrap()
        .execute("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, DelegatorError::Model(ref m) if m.contains("401")));
}

#[tokio::test]
async fn test_turn_limit() {
    let model = RuleModel::new(|_| {
        Ok(Message::assistant_with_tools(
            "",
            vec![ToolCall::new("again", "calculator", json!({"a": 1, "b": 1}))],
        ))
    });

    let err = Agent::builder(registry(), model.clone())
        .limits(limits(3, 1))
        .build()
        .unwrap()
        .execute("never stops")
        .await
        .unwrap_err();

    assert!(matches!(err, DelegatorError::MaxTurnsExceeded(3)));
    assert_eq!(model.requests.lock().unwrap().len(), 3);
}
