//! Delegator - tool-calling agents with sub-agent delegation
//!
//! Main entry point for the CLI application.

use std::sync::Arc;

use clap::Parser;
use delegator::llm::{ModelClient, OpenAiClient};
use delegator::{default_registry, Agent, Config, Repl};

/// Delegator - tool-calling agents with sub-agent delegation
#[derive(Parser, Debug)]
#[command(name = "delegator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model name
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum sub-agent nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum model round-trips per agent
    #[arg(long)]
    max_turns: Option<usize>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(model) = args.model {
        config.model.model = model;
    }
    if let Some(base_url) = args.base_url {
        config.model.base_url = base_url;
    }
    if let Some(max_depth) = args.max_depth {
        config.agent.max_depth = max_depth;
    }
    if let Some(max_turns) = args.max_turns {
        config.agent.max_turns = max_turns;
    }
    if let Some(log_level) = args.log_level {
        config.agent.log_level = log_level;
    }

    if args.init_config {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.agent.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(default_registry(&config)?);
    let client: Arc<dyn ModelClient> = Arc::new(OpenAiClient::from_config(&config)?);

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let answer = Agent::from_config(&config, registry, client)?
            .execute(&prompt)
            .await?;
        println!("{}", answer);
        return Ok(());
    }

    // Interactive REPL mode
    let repl = Repl::with_parts(config, registry, client);
    repl.run().await?;

    Ok(())
}
