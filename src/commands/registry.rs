use super::CommandResult;
use crate::cli::chat::ChatSession;

pub type CommandHandler = fn(&mut ChatSession, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        help: "Clear the conversation history.",
        handler: super::handle_clear,
    },
    Command {
        name: "model",
        help: "Switch models: /model <text-model> [vision-model]",
        handler: super::handle_model,
    },
    Command {
        name: "models",
        help: "List the built-in model catalog.",
        handler: super::handle_models,
    },
    Command {
        name: "image",
        help: "Analyze an image: /image <path> [prompt]",
        handler: super::handle_image,
    },
    Command {
        name: "info",
        help: "Show the active models, tools, and history size.",
        handler: super::handle_info,
    },
    Command {
        name: "log",
        help: "Toggle transcript logging or set the log file path.",
        handler: super::handle_log,
    },
    Command {
        name: "quit",
        help: "Exit the chat.",
        handler: super::handle_quit,
    },
];
