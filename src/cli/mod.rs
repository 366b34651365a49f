//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches into the chat
//! loop or one of the one-shot commands.

pub mod chat;
pub mod model_list;
pub mod say;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::provider::HttpProvider;
use crate::core::config::data::{DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};
use crate::core::config::{Config, ModelConfiguration};
use crate::core::credentials::resolve_env_credentials;
use crate::core::orchestrator::ConversationOrchestrator;

#[derive(Parser)]
#[command(name = "cevap")]
#[command(about = "A terminal chat assistant with text and vision models")]
#[command(
    long_about = "Cevap is a terminal chat assistant. Text turns go to an \
OpenAI-compatible chat completion API and can be routed through prompt-based \
tools; image turns go to a Gemini-style vision API.\n\n\
Environment Variables:\n\
  GROQ_API_KEY      API key for chat completions (required)\n\
  GEMINI_API_KEY    API key for image analysis (optional)\n\
  GROQ_BASE_URL     Chat endpoint override (optional)\n\
  GEMINI_BASE_URL   Vision endpoint override (optional)\n\n\
Chat commands:\n\
  /help             Show available commands\n\
  /model <id>       Switch models\n\
  /image <path>     Analyze an image\n\
  /clear            Clear the conversation\n\
  /quit             Exit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Text model to use for chat
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Vision model to use for image analysis
    #[arg(long, global = true, value_name = "MODEL")]
    pub vision_model: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one prompt and print the reply
    Say {
        /// The prompt text
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List the built-in model catalog
    Models,
    /// Set configuration values
    Set {
        /// Configuration key to set (text-model, vision-model)
        key: String,
        /// Value to set for the key
        value: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run_chat(args.model, args.vision_model, args.log).await,
        Commands::Say { prompt } => say::run_say(prompt, args.model, args.vision_model).await,
        Commands::Models => model_list::list_models(),
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "text-model" => match value {
                    Some(val) => {
                        config.text_model = Some(val.clone());
                        config.save()?;
                        println!("✅ Set text-model to: {val}");
                    }
                    None => println!(
                        "text-model: {}",
                        config.text_model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
                    ),
                },
                "vision-model" => match value {
                    Some(val) => {
                        config.vision_model = Some(val.clone());
                        config.save()?;
                        println!("✅ Set vision-model to: {val}");
                    }
                    None => println!(
                        "vision-model: {}",
                        config
                            .vision_model
                            .as_deref()
                            .unwrap_or(DEFAULT_VISION_MODEL)
                    ),
                },
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
    }
}

/// Resolve credentials and build the orchestrator, or exit with guidance
/// when the required key is missing.
fn build_orchestrator(
    config: &Config,
    model: Option<String>,
    vision_model: Option<String>,
) -> ConversationOrchestrator {
    let credentials = match resolve_env_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("❌ {err}");
            eprintln!();
            eprintln!("💡 Quick fixes:");
            for fix in err.quick_fixes() {
                eprintln!("  • {fix}");
            }
            std::process::exit(err.exit_code());
        }
    };

    let provider = Arc::new(HttpProvider::new(credentials));
    let model_config = ModelConfiguration::from_config(config).with_overrides(model, vision_model);
    ConversationOrchestrator::new(provider, model_config, config.history_window())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
