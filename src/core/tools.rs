//! Prompt-based tool registry
//!
//! Every tool is a prompt template resolved by a further completion call
//! against the configured text model; none of them computes anything
//! locally. The table is static and the lookup fails closed: a tool name
//! arriving from the remote model is an untrusted string until it matches
//! an entry here.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use tracing::debug;

use crate::api::provider::{Provider, ProviderError};
use crate::api::ChatMessage;
use crate::core::config::ModelConfiguration;
use crate::core::prompt::TIME_FORMAT;

/// Completion parameters for tool calls: small, cold, and predictable.
const TOOL_MAX_TOKENS: u32 = 2048;
const TOOL_TEMPERATURE: f32 = 0.1;

const TOOL_SYSTEM_PROMPT: &str = "You resolve one delegated sub-task. Reply with only the \
task output, accurate and structured, without preamble or commentary.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolKind {
    CurrentTime,
    TextAnalyzer,
    TextSummarizer,
    LanguageDetector,
    WebSearch,
}

pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    kind: ToolKind,
}

impl Tool {
    fn task_prompt(&self, argument: &str) -> String {
        match self.kind {
            ToolKind::CurrentTime => format!(
                "The current local time is {}.\n\
Present it as a short block with one line each for the date, the day of \
the week, and the clock time, in the language of this request: {argument}",
                Local::now().format(TIME_FORMAT)
            ),
            ToolKind::TextAnalyzer => format!(
                "Analyze the following text. Report word count, character count \
(including spaces), sentence count, average word length, detected language, \
tone (formal, informal, or neutral), and complexity (simple, medium, or \
complex) as a structured list.\n\nTEXT:\n{argument}"
            ),
            ToolKind::TextSummarizer => format!(
                "Summarize the following text. Keep the main ideas and the \
original tone. End with one line stating the original and summary word \
counts.\n\nTEXT:\n{argument}"
            ),
            ToolKind::LanguageDetector => format!(
                "Identify the language of the following text. Give the language, \
a confidence percentage, the clue words that support the call, and any \
mixed-in languages.\n\nTEXT:\n{argument}"
            ),
            ToolKind::WebSearch => format!(
                "Answer the following query from your general knowledge. Give \
the main answer first, then two or three supporting details. Say plainly \
when you are unsure or the information may be out of date.\n\nQUERY:\n{argument}"
            ),
        }
    }
}

const TOOLS: &[Tool] = &[
    Tool {
        name: "current_time",
        description: "Report the current local date and time. Use for questions \
like 'Saat kaç?', 'What time is it?', or anything about today's date.",
        kind: ToolKind::CurrentTime,
    },
    Tool {
        name: "text_analyzer",
        description: "Count words, characters, and sentences in a text and \
describe its language and tone. Use when the user asks to analyze text or \
for text statistics.",
        kind: ToolKind::TextAnalyzer,
    },
    Tool {
        name: "text_summarizer",
        description: "Summarize a text while keeping its main ideas. Use when \
the user asks to summarize, shorten, or condense something.",
        kind: ToolKind::TextSummarizer,
    },
    Tool {
        name: "language_detector",
        description: "Identify which language a text is written in. Use when \
the user asks what language something is.",
        kind: ToolKind::LanguageDetector,
    },
    Tool {
        name: "web_search",
        description: "Answer general knowledge questions about the world, \
current topics, or facts not present in the conversation.",
        kind: ToolKind::WebSearch,
    },
];

pub fn all_tools() -> &'static [Tool] {
    TOOLS
}

pub fn find_tool(name: &str) -> Option<&'static Tool> {
    TOOLS.iter().find(|tool| tool.name.eq_ignore_ascii_case(name))
}

#[derive(Debug)]
pub enum ToolError {
    UnknownTool(String),
    Provider(ProviderError),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            ToolError::Provider(err) => write!(f, "tool call failed: {err}"),
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::UnknownTool(_) => None,
            ToolError::Provider(err) => Some(err),
        }
    }
}

impl From<ProviderError> for ToolError {
    fn from(err: ProviderError) -> Self {
        ToolError::Provider(err)
    }
}

/// The static tool table bound to a provider handle and one configuration
/// snapshot. Rebuilt whole on every model switch.
pub struct ToolRegistry {
    provider: Arc<dyn Provider>,
    config: Arc<ModelConfiguration>,
}

impl ToolRegistry {
    pub fn new(provider: Arc<dyn Provider>, config: Arc<ModelConfiguration>) -> Self {
        Self { provider, config }
    }

    pub async fn invoke_by_name(&self, name: &str, argument: &str) -> Result<String, ToolError> {
        let tool = find_tool(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = tool.name, "invoking tool");

        let messages = vec![
            ChatMessage::system(TOOL_SYSTEM_PROMPT),
            ChatMessage::user(tool.task_prompt(argument)),
        ];
        let output = self
            .provider
            .complete(
                &messages,
                &self.config.text_model,
                TOOL_MAX_TOKENS,
                TOOL_TEMPERATURE,
            )
            .await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::utils::test_utils::StubProvider;

    fn registry_with(provider: Arc<StubProvider>) -> ToolRegistry {
        let config = Arc::new(ModelConfiguration::from_config(&Config::default()));
        ToolRegistry::new(provider, config)
    }

    #[test]
    fn the_tool_table_is_complete_and_unique() {
        assert_eq!(all_tools().len(), 5);
        let mut names: Vec<&str> = all_tools().iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 5);
        for tool in all_tools() {
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn lookup_is_case_insensitive_and_fails_closed() {
        assert!(find_tool("Current_Time").is_some());
        assert!(find_tool("current_time").is_some());
        assert!(find_tool("rm_rf").is_none());
        assert!(find_tool("").is_none());
    }

    #[tokio::test]
    async fn unknown_names_are_rejected_without_a_provider_call() {
        let provider = Arc::new(StubProvider::fixed("never"));
        let registry = registry_with(provider.clone());

        let err = registry
            .invoke_by_name("launch_rockets", "now")
            .await
            .expect_err("must fail");
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "launch_rockets"));
        assert!(provider.completion_calls().is_empty());
    }

    #[tokio::test]
    async fn invocation_wraps_the_argument_in_the_task_prompt() {
        let provider = Arc::new(StubProvider::fixed("five words, Turkish, informal"));
        let registry = registry_with(provider.clone());

        let output = registry
            .invoke_by_name("text_analyzer", "Bu bir deneme cümlesidir.")
            .await
            .expect("invoke");
        assert_eq!(output, "five words, Turkish, informal");

        let calls = provider.completion_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "llama-3.3-70b-versatile");
        let user_message = &calls[0].messages[1];
        assert_eq!(user_message.role, "user");
        assert!(user_message.content.contains("Bu bir deneme cümlesidir."));
        assert!(calls[0].messages[0].content.contains("delegated sub-task"));
    }

    #[tokio::test]
    async fn provider_failures_surface_as_tool_errors() {
        let provider = Arc::new(StubProvider::failing("socket closed"));
        let registry = registry_with(provider);

        let err = registry
            .invoke_by_name("web_search", "weather")
            .await
            .expect_err("must fail");
        assert!(matches!(err, ToolError::Provider(_)));
    }
}
