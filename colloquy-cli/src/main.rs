//! Colloquy CLI - chat with a persona under a token budget

mod repl;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colloquy_core::config::{ColloquyConfig, TokenizerKind};
use colloquy_core::conversation::{ConversationManager, HistoryStore, PersonaTable};
use colloquy_core::error::ColloquyError;

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(about = "Token-budgeted chat with personas and persistent history", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (otherwise colloquy.toml and COLLOQUY_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt, or start an interactive session when no prompt is given
    Chat(ChatArgs),
    /// Print a stored conversation history
    History {
        /// History file (defaults to the configured one)
        #[arg(long)]
        history_file: Option<PathBuf>,
    },
    /// List available personas
    Personas,
    /// Version information
    Version,
}

#[derive(Args)]
struct ChatArgs {
    /// Prompt to send
    prompt: Option<String>,

    /// Persona to switch to before chatting
    #[arg(short, long)]
    persona: Option<String>,

    /// Literal system message for a new conversation
    #[arg(long)]
    system: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature for this session's requests
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Maximum tokens per reply
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Maximum tokens kept in history
    #[arg(long)]
    token_budget: Option<usize>,

    /// History file to resume and update
    #[arg(long, conflicts_with_all = ["new_session", "in_memory"])]
    history_file: Option<PathBuf>,

    /// Start a new timestamped history file in the working directory
    #[arg(long, conflicts_with = "in_memory")]
    new_session: bool,

    /// Keep the conversation in memory only
    #[arg(long)]
    in_memory: bool,

    /// Count tokens with the byte-length approximation instead of tiktoken
    #[arg(long)]
    heuristic_tokens: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("colloquy {}", env!("CARGO_PKG_VERSION"));
            println!("colloquy-core {}", colloquy_core::VERSION);
        }
        Commands::Personas => {
            for (persona, text) in PersonaTable::new().entries() {
                println!("{:<22} {}", persona.name(), text);
            }
        }
        Commands::History { history_file } => {
            let config = load_config(cli.config.as_ref())?;
            let Some(path) = history_file.or(config.history_file) else {
                bail!("no history file given and none configured");
            };

            match HistoryStore::new(&path).load()? {
                Some(messages) => repl::print_history(&messages),
                None => bail!("history file not found: {}", path.display()),
            }
        }
        Commands::Chat(args) => {
            let config = load_config(cli.config.as_ref())?;
            run_chat(config, args).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ColloquyConfig> {
    let config = match path {
        Some(path) => ColloquyConfig::from_file(path),
        None => ColloquyConfig::load(),
    };
    config.context("Failed to load configuration")
}

async fn run_chat(mut config: ColloquyConfig, args: ChatArgs) -> Result<()> {
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(system) = args.system {
        config.system_message = Some(system);
    }
    if let Some(budget) = args.token_budget {
        config.token_budget = budget;
    }
    if args.heuristic_tokens {
        config.tokenizer = TokenizerKind::Heuristic;
    }

    if args.in_memory {
        config.history_file = None;
    } else if args.new_session {
        config.history_file = Some(HistoryStore::timestamped(".").path().to_path_buf());
    } else if let Some(path) = args.history_file {
        config.history_file = Some(path);
    }

    let mut manager = ConversationManager::from_config(&config)?;

    if let Some(name) = &args.persona {
        manager.set_persona(name)?;
    }

    if let Some(path) = manager.history_file() {
        tracing::info!(path = %path.display(), "Using history file");
    }

    match args.prompt {
        Some(prompt) => {
            match manager
                .chat_completion(&prompt, args.temperature, args.max_tokens)
                .await
            {
                Ok(reply) => println!("{}", reply),
                Err(ColloquyError::EmptyPrompt) => {
                    tracing::warn!("{}", ColloquyError::EmptyPrompt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => repl::run(&mut manager, args.temperature, args.max_tokens).await?,
    }

    Ok(())
}
