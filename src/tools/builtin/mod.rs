//! Built-in tools: calculator, shell and file access

pub mod calculator;
pub mod files;
pub mod shell;

use std::time::Duration;

use crate::core::{Config, Result};
use crate::tools::ToolRegistry;

pub use shell::ShellTool;

/// Register every built-in tool
pub fn register_builtins(registry: &mut ToolRegistry, config: &Config) -> Result<()> {
    registry.register_tool(&calculator::signature(), calculator::capability())?;

    let shell = ShellTool::new(Duration::from_secs(config.agent.tool_timeout_secs));
    registry.register_tool(&ShellTool::signature(), shell.capability())?;

    registry.register_tool(&files::create_file_signature(), files::create_file())?;
    registry.register_tool(&files::read_file_signature(), files::read_file())?;
    registry.register_tool(&files::modify_file_signature(), files::modify_file())?;
    Ok(())
}
