//! CLI commands
//!
//! Slash commands understood by the REPL. Anything else is a task.

use crate::core::Config;
use crate::tools::ToolRegistry;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Run the input as a task
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
}

/// Parse and handle slash commands
pub fn handle_command(input: &str, registry: &ToolRegistry, config: &Config) -> CommandResult {
    let input = input.trim();
    let Some(command) = input.strip_prefix('/') else {
        return CommandResult::Continue(input.to_string());
    };

    match command.split_whitespace().next().unwrap_or("").to_lowercase().as_str() {
        "exit" | "quit" | "q" => CommandResult::Exit,
        "help" | "?" => CommandResult::Handled(help_text()),
        "tools" => CommandResult::Handled(tools_text(registry)),
        "status" => CommandResult::Handled(status_text(config)),
        other => CommandResult::Handled(format!(
            "Unknown command: /{}\nType /help for available commands.",
            other
        )),
    }
}

fn help_text() -> String {
    r#"Delegator Commands:
─────────────────────────────
  /help, /?     Show this help
  /tools        List registered tools
  /status       Show model and limits
  /exit, /quit  Exit

Any other input runs as a new task with a fresh agent."#
        .to_string()
}

fn tools_text(registry: &ToolRegistry) -> String {
    let mut output = format!("Registered tools ({}):\n", registry.len());
    for name in registry.names() {
        if let Some(tool) = registry.lookup(&name) {
            output.push_str(&format!(
                "  {}({}) - {}\n",
                tool.name(),
                tool.required().join(", "),
                tool.description()
            ));
        }
    }
    output.trim_end().to_string()
}

fn status_text(config: &Config) -> String {
    format!(
        "Delegator Status:\n\
         ─────────────────────────────\n\
         Endpoint:   {}\n\
         Model:      {}\n\
         Max turns:  {}\n\
         Max depth:  {}\n\
         Tool timeout: {}s",
        config.model.base_url,
        config.model.model,
        config.agent.max_turns,
        config.agent.max_depth,
        config.agent.tool_timeout_secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_registry;

    #[test]
    fn test_plain_input_is_a_task() {
        let config = Config::default();
        let registry = ToolRegistry::new();
        assert_eq!(
            handle_command("  what is 2+3? ", &registry, &config),
            CommandResult::Continue("what is 2+3?".to_string())
        );
    }

    #[test]
    fn test_commands() {
        let config = Config::default();
        let registry = default_registry(&config).unwrap();

        assert_eq!(handle_command("/exit", &registry, &config), CommandResult::Exit);
        assert_eq!(handle_command("/QUIT", &registry, &config), CommandResult::Exit);

        match handle_command("/tools", &registry, &config) {
            CommandResult::Handled(text) => {
                assert!(text.starts_with("Registered tools (6):"));
                assert!(text.contains("calculator(a, b)"));
                assert!(text.contains("task(prompt, tools, user_input)"));
            }
            other => panic!("unexpected {:?}", other),
        }

        match handle_command("/frobnicate", &registry, &config) {
            CommandResult::Handled(text) => assert!(text.starts_with("Unknown command")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
