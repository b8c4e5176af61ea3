use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;
mod prompt;
mod session;

use commands::AgentOptions;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the agent config file (defaults to $COZE_WORKSPACE_PATH/config/agent_llm_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Session(TurnArgs),

    /// Send one message and print the answer
    Run {
        /// The message to send
        text: String,

        #[command(flatten)]
        turn: TurnArgs,
    },

    /// List the available tools and their parameters
    Tools,
}

#[derive(Args)]
struct TurnArgs {
    /// Conversation id; a random one is generated when omitted
    #[arg(short, long)]
    session: Option<String>,

    /// Keep conversation history between turns (same as COZE_PROJECT_ENV=DEV)
    #[arg(long)]
    dev: bool,

    /// Extra header for every model request, as name=value
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
}

impl TurnArgs {
    fn session_id(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    fn options(&self, config: Option<PathBuf>) -> AgentOptions {
        AgentOptions {
            config,
            dev: self.dev,
            headers: self.headers.clone(),
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header name must not be empty"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr so they never interleave with rendered answers
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adcraft=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Session(turn) => {
            commands::session::execute(turn.options(cli.config), turn.session_id()).await
        }
        Command::Run { text, turn } => {
            commands::run::execute(turn.options(cli.config), turn.session_id(), text).await
        }
        Command::Tools => commands::tools::execute(),
    }
}
