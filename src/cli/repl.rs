//! Interactive REPL for Delegator
//!
//! Every line is an independent task: a new top-level agent is built for it
//! and dropped once it answers.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::agent::Agent;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};
use crate::llm::ModelClient;
use crate::tools::ToolRegistry;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    config: Config,
    registry: Arc<ToolRegistry>,
    client: Arc<dyn ModelClient>,
}

impl Repl {
    /// Create a REPL from already-built parts
    pub fn with_parts(
        config: Config,
        registry: Arc<ToolRegistry>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            config,
            registry,
            client,
        }
    }

    /// Run one task with a fresh top-level agent
    pub async fn run_task(&self, input: &str) -> Result<String> {
        Agent::from_config(&self.config, self.registry.clone(), self.client.clone())?
            .execute(input)
            .await
    }

    /// Run the REPL
    pub async fn run(&self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.registry, &self.config) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Handled(output) => println!("{}\n", output),
                CommandResult::Continue(task) => match self.run_task(&task).await {
                    Ok(answer) => println!("\nAssistant:\n{}\n", answer),
                    Err(e) => eprintln!("\nError: {}\n", e),
                },
            }
        }

        Ok(())
    }

    fn print_banner(&self) {
        println!("Delegator - tool-calling agents with sub-agent delegation");
        println!("Model:  {} ({})", self.config.model.model, self.client.name());
        println!("Tools:  {}", self.registry.names().join(", "));
        println!();
        println!("Commands: /help, /tools, /status, /exit");
        println!("────────────────────────────────────────────────────────────");
    }
}
