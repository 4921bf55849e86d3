//! OpenAI-compatible client implementation
//!
//! Async HTTP client for `/chat/completions` endpoints with tool calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{
    Config, DelegatorError, Message, RawArguments, Result, Role, ToolCall, ToolDefinition,
};
use crate::llm::traits::ModelClient;

/// OpenAI-compatible API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: url::Url,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Message in wire format
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Tool call in wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunction,
}

/// Function in a wire tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    arguments: RawArguments,
}

fn function_type() -> String {
    "function".to_string()
}

/// Chat completions response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()
            .map_err(|e| DelegatorError::with_context("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: config.completions_url()?,
            api_key: config.model.api_key.clone(),
            model: config.model.model.clone(),
            temperature: config.model.temperature,
        })
    }

    /// Convert internal Message to wire format
    fn to_wire_message(msg: &Message) -> WireMessage {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| WireToolCall {
                    id: tc.id.clone(),
                    call_type: function_type(),
                    function: WireFunction {
                        name: tc.name.clone(),
                        arguments: RawArguments::Text(tc.arguments.to_text()),
                    },
                })
                .collect::<Vec<_>>()
        });

        // Assistant turns that only carry tool calls go out with null content
        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        };

        WireMessage {
            role: msg.role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
            name: msg.name.clone(),
        }
    }

    /// Convert the first choice of a response to a Message
    fn to_message(response: ChatResponse) -> Result<Message> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DelegatorError::model("Response contained no choices"))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let content = choice.message.content.unwrap_or_default();
        if tool_calls.is_empty() {
            Ok(Message::assistant(content))
        } else {
            Ok(Message::assistant_with_tools(content, tool_calls))
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn create(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: (!tools.is_empty()).then_some(tools),
            temperature: self.temperature,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                DelegatorError::model(format!("Cannot connect to {}", self.endpoint))
            } else if e.is_timeout() {
                DelegatorError::model(format!("Request to {} timed out", self.endpoint))
            } else {
                DelegatorError::model(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DelegatorError::model(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| DelegatorError::model(format!("Failed to read response: {}", e)))?;
        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| DelegatorError::model(format!("Failed to parse response: {}", e)))?;

        if let Some(ref usage) = chat_response.usage {
            debug!(
                model = chat_response.model.as_deref().unwrap_or(&self.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        Self::to_message(chat_response)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
