//! Shell command execution

use std::process::Stdio;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::info;

use crate::tools::{Capability, ToolArgs, ToolContext, ToolHandler, ToolSignature};

/// Runs a command through the platform shell, killing it after `timeout`
#[derive(Debug, Clone)]
pub struct ShellTool {
    timeout: Duration,
}

impl ShellTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn signature() -> ToolSignature {
        ToolSignature::new("cmd")
            .doc(
                "Run a shell command and return its stdout, stderr and return code.\n\
                 * `command` - The command line to execute",
            )
            .param("command", "String")
    }

    pub fn capability(self) -> Capability {
        Capability::handler(self)
    }

    /// Run `command` and format its output
    pub async fn run(&self, command: &str) -> anyhow::Result<String> {
        info!(command = %command, "Executing command");

        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(shell)
                .arg(shell_arg)
                .arg(command)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| anyhow!("command timed out after {:?}", self.timeout))?
        .map_err(|e| anyhow!("failed to execute command: {}", e))?;

        Ok(format!(
            "stdout: {}\nstderr: {}\nreturncode: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
            output.status.code().unwrap_or(-1)
        ))
    }
}

#[async_trait]
impl ToolHandler for ShellTool {
    async fn call(&self, args: ToolArgs, _ctx: ToolContext) -> anyhow::Result<Value> {
        let command = args.get_str("command")?;
        Ok(Value::String(self.run(command).await?))
    }
}
