//! Interactive line-based chat loop

use std::error::Error;
use std::fs;
use std::io::{self, Write};

use crate::commands::{self, CommandResult};
use crate::core::catalog::{load_model_catalog, ModelCatalog};
use crate::core::config::Config;
use crate::core::orchestrator::ConversationOrchestrator;
use crate::utils::logging::LoggingState;

/// Everything one chat session owns: the orchestrator, transcript logging,
/// and the model catalog the `/model` command validates against.
pub struct ChatSession {
    pub orchestrator: ConversationOrchestrator,
    pub logging: LoggingState,
    pub catalog: ModelCatalog,
}

pub async fn run_chat(
    model: Option<String>,
    vision_model: Option<String>,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let orchestrator = super::build_orchestrator(&config, model, vision_model);
    let logging = LoggingState::new(log_file)?;
    let mut session = ChatSession {
        orchestrator,
        logging,
        catalog: load_model_catalog(),
    };

    print_banner(&session);

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break; // EOF
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        match commands::process_input(&mut session, line) {
            CommandResult::Respond(text) => println!("{text}\n"),
            CommandResult::ProcessAsMessage(text) => {
                send_message(&mut session, &text, None).await;
            }
            CommandResult::SubmitImage { path, prompt } => match fs::read(&path) {
                Ok(bytes) => send_message(&mut session, &prompt, Some(bytes)).await,
                Err(e) => println!("Could not read {path}: {e}\n"),
            },
            CommandResult::Quit => break,
        }
    }

    Ok(())
}

async fn send_message(session: &mut ChatSession, text: &str, image: Option<Vec<u8>>) {
    if let Err(e) = session.logging.log_message(&format!("You: {text}")) {
        eprintln!("⚠️  Could not write transcript log: {e}");
    }

    let reply = session.orchestrator.handle(text, image.as_deref()).await;
    println!("{reply}\n");

    if let Err(e) = session.logging.log_message(&reply) {
        eprintln!("⚠️  Could not write transcript log: {e}");
    }
}

fn print_banner(session: &ChatSession) {
    let config = session.orchestrator.config();
    eprintln!("🚀 Starting Cevap - Terminal Chat Assistant");
    eprintln!("📝 Text model: {}", config.text_model);
    eprintln!("👁️  Vision model: {}", config.vision_model);
    eprintln!("💡 Type /help for commands, /quit to exit");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
