//! Tool dispatcher - routes tool calls to their capabilities
//!
//! Every failure on this path (unknown tool, bad arguments, a tool body that
//! errors or panics) is turned into result text for the model. Nothing here
//! aborts the conversation loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::{DelegatorError, RawArguments, Result, ToolCall, ToolCallResult};
use crate::tools::context::{ToolArgs, ToolContext};
use crate::tools::registry::Capability;

/// Dispatches tool calls on behalf of one agent
#[derive(Clone)]
pub struct ToolDispatcher {
    ctx: ToolContext,
}

impl ToolDispatcher {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one call and return its result text
    pub async fn dispatch(&self, name: &str, arguments: &RawArguments) -> String {
        match self.try_dispatch(name, arguments).await {
            Ok(value) => stringify_output(value),
            Err(e) => error_text(&e),
        }
    }

    /// Dispatch one call, keeping the error typed
    pub async fn try_dispatch(&self, name: &str, arguments: &RawArguments) -> Result<Value> {
        let descriptor = self
            .ctx
            .registry
            .lookup(name)
            .ok_or_else(|| DelegatorError::UnknownTool(name.to_string()))?;

        if !self.ctx.can_use(name) {
            return Err(DelegatorError::ToolNotAvailable(name.to_string()));
        }

        let parsed = arguments.parse(name)?;
        descriptor.validate(&parsed)?;
        let args = ToolArgs::new(name, parsed);

        let outcome = match descriptor.capability().clone() {
            Capability::Async(handler) => {
                AssertUnwindSafe(handler.call(args, self.ctx.clone()))
                    .catch_unwind()
                    .await
                    .map_err(|panic| {
                        DelegatorError::tool(format!("tool panicked: {}", panic_message(&*panic)))
                    })?
            }
            Capability::Blocking(f) => tokio::task::spawn_blocking(move || f(args))
                .await
                .map_err(|e| {
                    if e.is_panic() {
                        DelegatorError::tool(format!(
                            "tool panicked: {}",
                            panic_message(&*e.into_panic())
                        ))
                    } else {
                        DelegatorError::tool(format!("tool task failed: {}", e))
                    }
                })?,
        };

        outcome.map_err(|e| DelegatorError::tool(format!("{:#}", e)))
    }

    /// Dispatch one model-issued call
    pub async fn dispatch_call(&self, call: &ToolCall) -> ToolCallResult {
        info!(
            tool = %call.name,
            call_id = %call.id,
            depth = self.ctx.depth,
            "Dispatching tool call"
        );

        match self.try_dispatch(&call.name, &call.arguments).await {
            Ok(value) => {
                let output = stringify_output(value);
                debug!(tool = %call.name, call_id = %call.id, chars = output.len(), "Tool succeeded");
                ToolCallResult::success(call, output)
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool failed");
                ToolCallResult::failure(call, error_text(&e))
            }
        }
    }

    /// Run all calls of one assistant turn concurrently.
    ///
    /// Waits for every call, then returns results in the order of `calls`
    /// regardless of completion order.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        let mut set: JoinSet<(usize, ToolCallResult)> = JoinSet::new();

        for (index, call) in calls.iter().cloned().enumerate() {
            let dispatcher = self.clone();
            set.spawn(async move {
                let result = dispatcher.dispatch_call(&call).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<ToolCallResult>> = vec![None; calls.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "Tool task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(calls)
            .map(|(slot, call)| {
                slot.unwrap_or_else(|| {
                    ToolCallResult::failure(call, "Error: tool task did not complete")
                })
            })
            .collect()
    }
}

/// Normalize a tool's return value to the text the model sees
pub fn stringify_output(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn error_text(error: &DelegatorError) -> String {
    format!("Error: {}", error)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
