//! Conversation orchestration
//!
//! One orchestrator owns one conversation: the bounded history, the model
//! configuration snapshot, and the tool registry bound to it. A text turn
//! runs through an explicit ordered chain of attempt strategies; the first
//! success wins and every failure path ends in a user-readable string,
//! never a propagated error.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;
use tracing::debug;

use crate::api::provider::{Provider, ProviderError};
use crate::api::ChatMessage;
use crate::core::config::ModelConfiguration;
use crate::core::history::ConversationHistory;
use crate::core::message::Message;
use crate::core::prompt::{self, HISTORY_DIGEST_MESSAGES};
use crate::core::tools::{all_tools, ToolError, ToolRegistry};

const DEFAULT_IMAGE_PROMPT: &str = "Describe this image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    AwaitingProviderResponse,
}

/// Strategies for answering a text turn, tried in order. The chain is the
/// whole fallback policy: no retries, no hidden control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    ToolOrchestration,
    DirectCompletion,
}

const ATTEMPT_CHAIN: &[Attempt] = &[Attempt::ToolOrchestration, Attempt::DirectCompletion];

#[derive(Debug)]
enum AttemptError {
    Provider(ProviderError),
    Tool(ToolError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Provider(err) => write!(f, "{err}"),
            AttemptError::Tool(err) => write!(f, "{err}"),
        }
    }
}

impl From<ProviderError> for AttemptError {
    fn from(err: ProviderError) -> Self {
        AttemptError::Provider(err)
    }
}

impl From<ToolError> for AttemptError {
    fn from(err: ToolError) -> Self {
        AttemptError::Tool(err)
    }
}

/// What the remote model decided to do with a turn. The tool name is an
/// untrusted string until the registry validates it.
#[derive(Debug, PartialEq, Eq)]
enum ToolDecision {
    Reply(String),
    Invoke { tool: String, argument: String },
}

#[derive(Deserialize)]
struct DecisionPayload {
    tool: Option<String>,
    argument: Option<String>,
    reply: Option<String>,
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Interpret the model's decision reply. Anything that is not a
/// well-formed tool decision counts as a direct answer.
fn parse_decision(text: &str) -> ToolDecision {
    let trimmed = text.trim();
    if let Some(json) = extract_json_object(trimmed) {
        if let Ok(payload) = serde_json::from_str::<DecisionPayload>(json) {
            if let Some(tool) = payload.tool.filter(|name| !name.is_empty()) {
                return ToolDecision::Invoke {
                    tool,
                    argument: payload.argument.unwrap_or_default(),
                };
            }
            if let Some(reply) = payload.reply {
                return ToolDecision::Reply(reply);
            }
        }
    }
    ToolDecision::Reply(trimmed.to_string())
}

pub struct ConversationOrchestrator {
    provider: Arc<dyn Provider>,
    config: Arc<ModelConfiguration>,
    tools: ToolRegistry,
    history: ConversationHistory,
    state: OrchestratorState,
}

impl ConversationOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        config: ModelConfiguration,
        history_window: usize,
    ) -> Self {
        let config = Arc::new(config);
        let tools = ToolRegistry::new(Arc::clone(&provider), Arc::clone(&config));
        Self {
            provider,
            config,
            tools,
            history: ConversationHistory::new(history_window),
            state: OrchestratorState::Idle,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn config(&self) -> &ModelConfiguration {
        &self.config
    }

    /// Process one user turn. Always returns printable text; failures come
    /// back as messages, never as panics or errors.
    pub async fn handle(&mut self, user_text: &str, image: Option<&[u8]>) -> String {
        // The snapshot taken here is the one configuration this whole
        // exchange runs against, even across tool calls.
        let config = Arc::clone(&self.config);

        if let Some(bytes) = image {
            return self.handle_image(user_text, bytes, &config).await;
        }

        self.state = OrchestratorState::AwaitingProviderResponse;
        let mut failures: Vec<String> = Vec::new();
        let mut reply = None;

        for attempt in ATTEMPT_CHAIN {
            match self.run_attempt(*attempt, user_text, &config).await {
                Ok(text) => {
                    reply = Some(text);
                    break;
                }
                Err(err) => {
                    debug!(attempt = ?attempt, error = %err, "attempt failed");
                    failures.push(err.to_string());
                }
            }
        }
        self.state = OrchestratorState::Idle;

        match reply {
            Some(text) => {
                self.record_exchange(user_text, &text, false);
                text
            }
            None => failure_text(&failures),
        }
    }

    async fn handle_image(
        &mut self,
        user_text: &str,
        image: &[u8],
        config: &ModelConfiguration,
    ) -> String {
        let display_text = if user_text.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            user_text
        };
        let vision_prompt = prompt::compose_vision(display_text, Local::now());

        self.state = OrchestratorState::AwaitingProviderResponse;
        let result = self
            .provider
            .analyze_image(&vision_prompt, image, &config.vision_model)
            .await;
        self.state = OrchestratorState::Idle;

        match result {
            Ok(text) => {
                self.record_exchange(display_text, &text, true);
                text
            }
            Err(err) => {
                debug!(error = %err, "image analysis failed");
                format!("Image analysis failed: {err}")
            }
        }
    }

    async fn run_attempt(
        &self,
        attempt: Attempt,
        user_text: &str,
        config: &ModelConfiguration,
    ) -> Result<String, AttemptError> {
        match attempt {
            Attempt::ToolOrchestration => self.run_tool_orchestration(user_text, config).await,
            Attempt::DirectCompletion => self.run_direct_completion(user_text, config).await,
        }
    }

    async fn run_tool_orchestration(
        &self,
        user_text: &str,
        config: &ModelConfiguration,
    ) -> Result<String, AttemptError> {
        let recent: Vec<Message> = self
            .history
            .recent(HISTORY_DIGEST_MESSAGES)
            .cloned()
            .collect();
        let task = prompt::classify(user_text);
        let composed = prompt::compose(task, user_text, &recent, false, Local::now());
        let decision_prompt = prompt::decision_prompt(
            &composed,
            all_tools().iter().map(|t| (t.name, t.description)),
        );

        let messages = vec![
            ChatMessage::system(&config.system_prompt),
            ChatMessage::user(decision_prompt),
        ];
        let decision_text = self
            .provider
            .complete(
                &messages,
                &config.text_model,
                config.max_tokens,
                config.temperature,
            )
            .await?;

        match parse_decision(&decision_text) {
            ToolDecision::Reply(text) => Ok(text),
            ToolDecision::Invoke { tool, argument } => {
                debug!(tool = %tool, "model requested a tool");
                let output = self.tools.invoke_by_name(&tool, &argument).await?;

                let followup = prompt::tool_followup(user_text, &tool, &output);
                let messages = vec![
                    ChatMessage::system(&config.system_prompt),
                    ChatMessage::user(followup),
                ];
                let final_text = self
                    .provider
                    .complete(
                        &messages,
                        &config.text_model,
                        config.max_tokens,
                        config.temperature,
                    )
                    .await?;
                Ok(final_text)
            }
        }
    }

    /// The last resort: system prompt plus the raw user text, nothing else.
    async fn run_direct_completion(
        &self,
        user_text: &str,
        config: &ModelConfiguration,
    ) -> Result<String, AttemptError> {
        let messages = vec![
            ChatMessage::system(&config.system_prompt),
            ChatMessage::user(user_text),
        ];
        let text = self
            .provider
            .complete(
                &messages,
                &config.text_model,
                config.max_tokens,
                config.temperature,
            )
            .await?;
        Ok(text)
    }

    fn record_exchange(&mut self, user_text: &str, reply: &str, has_image: bool) {
        let mut user = Message::user(user_text);
        if has_image {
            user = user.with_image();
        }
        self.history.push_exchange(user, Message::assistant(reply));
    }

    /// Swap in a fresh configuration and rebind the tool registry to it.
    /// The history is untouched; the next exchange picks up the new
    /// snapshot whole.
    pub fn switch_model(&mut self, text_model: &str, vision_model: &str) -> String {
        let next = Arc::new(self.config.with_models(text_model, vision_model));
        self.config = Arc::clone(&next);
        self.tools = ToolRegistry::new(Arc::clone(&self.provider), next);
        debug!(text_model, vision_model, "model configuration replaced");
        format!("Models updated. Text: {text_model}. Vision: {vision_model}.")
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn info(&self) -> String {
        format!(
            "Text model: {}\nVision model: {}\nTools: {}\nHistory: {} messages (window: {} exchanges)",
            self.config.text_model,
            self.config.vision_model,
            all_tools().len(),
            self.history.len(),
            self.history.max_exchanges(),
        )
    }
}

fn failure_text(failures: &[String]) -> String {
    match failures.last() {
        Some(last) => format!("The request could not be completed: {last}"),
        None => "The request could not be completed.".to_string(),
    }
}
