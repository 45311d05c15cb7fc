use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use athena_actions::ReferenceDataPolicy;
use athena_config::{AthenaConfig, ConfigLoader};
use athena_core::{Memory, Runtime};
use athena_llm::LlmProvider;
use athena_llm::openai::OpenAiProvider;
use athena_runtime::AgentRuntime;

mod chat;

/// Athena: market data, web search and price-oracle actions for agents
#[derive(Parser)]
#[command(name = "athena", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to athena.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered actions
    Actions,
    /// Invoke one action with a user message
    Run {
        /// Action name or simile, e.g. GET_MARKETS
        action: String,
        /// The user message the action should answer
        text: String,
        /// Print delivered contents as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat in the terminal
    Chat,
}

impl Cli {
    pub async fn run(self) -> athena_core::Result<()> {
        let loader = ConfigLoader::load(self.config.as_deref())?;
        let config = loader.get();

        // --verbose > --log-level > config
        let log_level = if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| config.logging.level.clone())
        };
        init_tracing(config, &log_level);
        info!(path = %loader.path().display(), "configuration loaded");

        let runtime = build_runtime(config)?;
        runtime.initialize().await;

        match self.command {
            Commands::Actions => cmd_actions(&runtime).await,
            Commands::Run { action, text, json } => cmd_run(&runtime, &action, &text, json).await,
            Commands::Chat => chat::cmd_chat(&runtime).await,
        }
    }
}

fn init_tracing(config: &AthenaConfig, log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let result = if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

/// A runtime with every plugin registered against `config`.
pub fn build_runtime(config: &AthenaConfig) -> athena_core::Result<AgentRuntime> {
    let api_key = config.agent.api_key.clone().unwrap_or_else(|| {
        warn!("no model API key configured; set OPENAI_API_KEY or agent.api_key");
        String::new()
    });
    let llm: Arc<dyn LlmProvider> =
        Arc::new(OpenAiProvider::new(api_key).with_base_url(config.agent.base_url.clone()));

    let policy = ReferenceDataPolicy::from_config(config);
    let mut runtime = AgentRuntime::from_config(config, llm);
    runtime.register(plugin_web_search::web_search_plugin())?;
    runtime.register(plugin_coingecko::coingecko_plugin(policy))?;
    runtime.register(plugin_pyth_data::pyth_data_plugin())?;
    Ok(runtime)
}

async fn cmd_actions(runtime: &AgentRuntime) -> athena_core::Result<()> {
    let probe = Memory::user_text(runtime.agent_id(), Uuid::new_v4(), Uuid::new_v4(), "");
    println!(
        "{:<28} {:<12} {:<6} {:<9} SIMILES",
        "ACTION", "PLUGIN", "READY", "EXAMPLES"
    );
    for plugin in runtime.plugins() {
        for action in &plugin.actions {
            let ready = if action.validate(runtime, &probe).await {
                "yes"
            } else {
                "no"
            };
            println!(
                "{:<28} {:<12} {:<6} {:<9} {}",
                action.name(),
                plugin.name,
                ready,
                action.examples().len(),
                action.similes().join(", ")
            );
        }
    }
    Ok(())
}

async fn cmd_run(
    runtime: &AgentRuntime,
    action: &str,
    text: &str,
    json: bool,
) -> athena_core::Result<()> {
    let (ok, delivered) = runtime.invoke(action, text, Uuid::new_v4()).await?;
    if delivered.is_empty() {
        println!("{action} is not available with the current settings.");
        return Ok(());
    }
    for content in &delivered {
        if json {
            println!("{}", serde_json::to_string_pretty(content)?);
        } else {
            println!("{}", content.text);
        }
    }
    if !ok {
        warn!(action, "action reported failure");
    }
    Ok(())
}
