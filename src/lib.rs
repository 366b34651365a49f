//! Cevap is a terminal chat assistant for working with remote LLM APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns conversation state: the bounded history, model
//!   configuration, prompt composition, the tool registry, and the
//!   orchestrator that ties them together.
//! - [`api`] defines the wire payloads and the provider clients for the
//!   chat completion and vision endpoints.
//! - [`commands`] implements slash-command parsing and execution used by
//!   the chat loop.
//! - [`cli`] parses arguments and runs the interactive loop and the
//!   one-shot subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;
