//! Slash-command parsing and execution for the chat loop

mod registry;

pub use registry::{all_commands, find_command, CommandInvocation};

use crate::cli::chat::ChatSession;
use crate::cli::model_list::render_model_catalog;

pub enum CommandResult {
    /// Command handled; print this text.
    Respond(String),
    /// Not a command; send it to the orchestrator as a message.
    ProcessAsMessage(String),
    /// Command asks for an image turn; the chat loop performs it.
    SubmitImage { path: String, prompt: String },
    /// Leave the chat loop.
    Quit,
}

pub fn process_input(session: &mut ChatSession, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(session, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub(super) fn handle_help(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  /{:<8} {}\n", command.name, command.help));
    }
    CommandResult::Respond(help)
}

pub(super) fn handle_clear(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    session.orchestrator.clear();
    CommandResult::Respond("Conversation cleared.".to_string())
}

pub(super) fn handle_model(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut parts = invocation.args.split_whitespace();
    let Some(text_model) = parts.next() else {
        let config = session.orchestrator.config();
        return CommandResult::Respond(format!(
            "Active text model: {}\nActive vision model: {}\nUsage: /model <text-model> [vision-model]",
            config.text_model, config.vision_model
        ));
    };
    let vision_model = parts
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| session.orchestrator.config().vision_model.clone());

    if !session.catalog.has_text_model(text_model) {
        return CommandResult::Respond(format!(
            "Unknown text model: {text_model}\n\n{}",
            render_model_catalog(&session.catalog)
        ));
    }
    if !session.catalog.has_vision_model(&vision_model) {
        return CommandResult::Respond(format!(
            "Unknown vision model: {vision_model}\n\n{}",
            render_model_catalog(&session.catalog)
        ));
    }

    CommandResult::Respond(session.orchestrator.switch_model(text_model, &vision_model))
}

pub(super) fn handle_models(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Respond(render_model_catalog(&session.catalog))
}

pub(super) fn handle_image(
    _session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut parts = invocation.args.splitn(2, ' ');
    match parts.next().filter(|path| !path.is_empty()) {
        Some(path) => CommandResult::SubmitImage {
            path: path.to_string(),
            prompt: parts.next().unwrap_or("").trim().to_string(),
        },
        None => CommandResult::Respond("Usage: /image <path> [prompt]".to_string()),
    }
}

pub(super) fn handle_info(
    session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Respond(format!(
        "{}\nTranscript log: {}",
        session.orchestrator.info(),
        session.logging.get_status_string()
    ))
}

pub(super) fn handle_log(
    session: &mut ChatSession,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let parts: Vec<&str> = invocation.input.split_whitespace().collect();

    match parts.len() {
        1 => match session.logging.toggle_logging() {
            Ok(message) => CommandResult::Respond(message),
            Err(e) => CommandResult::Respond(format!("Log error: {e}")),
        },
        2 => match session.logging.set_log_file(parts[1].to_string()) {
            Ok(message) => CommandResult::Respond(message),
            Err(e) => CommandResult::Respond(format!("Logfile error: {e}")),
        },
        _ => CommandResult::Respond("Usage: /log [filename]".to_string()),
    }
}

pub(super) fn handle_quit(
    _session: &mut ChatSession,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}
