//! Prompt composition
//!
//! Pure functions that turn a user turn into the instruction block sent to
//! the remote model. The wall-clock instant is always a parameter, so the
//! same inputs at the same instant compose the same prompt.

use chrono::{DateTime, Local};

use crate::core::message::Message;

/// Timestamp format embedded in composed prompts, e.g.
/// `05.08.2026 Wednesday 14:30:00`.
pub const TIME_FORMAT: &str = "%d.%m.%Y %A %H:%M:%S";

/// How many trailing history messages are folded into a prompt.
pub const HISTORY_DIGEST_MESSAGES: usize = 4;

/// Per-message budget when folding history into a prompt.
const HISTORY_SNIPPET_MAX: usize = 500;

/// Coarse classification of a user turn, used to pick the task
/// instructions for the composed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    GeneralChat,
    TimeQuery,
    TextAnalysis,
    Summarization,
    LanguageDetection,
}

/// Trigger phrases per task, Turkish and English. First match wins;
/// anything else is general chat.
const TASK_PATTERNS: &[(TaskKind, &[&str])] = &[
    (
        TaskKind::TimeQuery,
        &[
            "saat kaç",
            "saat kac",
            "kaç saat",
            "zaman nedir",
            "tarih",
            "bugün ne",
            "hangi gün",
            "what time",
            "current time",
            "time now",
            "what day",
            "what date",
            "today's date",
        ],
    ),
    (
        TaskKind::Summarization,
        &["özetle", "ozetle", "kısalt", "kisalt", "summarize", "summary", "tl;dr"],
    ),
    (
        TaskKind::TextAnalysis,
        &[
            "analiz et",
            "kaç kelime",
            "kac kelime",
            "istatistik",
            "analyze",
            "analyse",
            "how many words",
            "word count",
            "statistics",
        ],
    ),
    (
        TaskKind::LanguageDetection,
        &[
            "hangi dil",
            "dil analizi",
            "which language",
            "what language",
            "language detection",
            "detect the language",
        ],
    ),
];

pub fn classify(user_text: &str) -> TaskKind {
    let lowered = user_text.to_lowercase();
    for (kind, patterns) in TASK_PATTERNS {
        if patterns.iter().any(|p| lowered.contains(p)) {
            return *kind;
        }
    }
    TaskKind::GeneralChat
}

/// Build the instruction block for a text turn.
pub fn compose(
    task: TaskKind,
    user_text: &str,
    recent_history: &[Message],
    has_image: bool,
    now: DateTime<Local>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("[CONTEXT]\n");
    prompt.push_str(&format!("Local time: {}\n", now.format(TIME_FORMAT)));

    if !recent_history.is_empty() {
        prompt.push_str("\n[RECENT CONVERSATION]\n");
        for message in recent_history {
            prompt.push_str(&format!(
                "{}: {}\n",
                message.role.as_str(),
                truncate_chars(&message.content, HISTORY_SNIPPET_MAX)
            ));
        }
    }

    prompt.push_str("\n[USER MESSAGE]\n");
    prompt.push_str(user_text);
    prompt.push('\n');

    prompt.push_str("\n[TASK]\n");
    prompt.push_str(task_instructions(task));
    prompt.push('\n');

    if has_image {
        prompt.push_str(
            "\n[IMAGE]\nAn image is attached. Describe the main objects and composition, \
read any visible text, and note relevant context before answering.\n",
        );
    }

    prompt
}

fn task_instructions(task: TaskKind) -> &'static str {
    match task {
        TaskKind::GeneralChat => {
            "Answer the message in the user's language. Be helpful and concise, \
and use the conversation above for context."
        }
        TaskKind::TimeQuery => {
            "This is a time or date question. Use the local time given in the \
context above, verbatim, and answer in the user's language with both the \
date and the time."
        }
        TaskKind::TextAnalysis => {
            "Analyze the text in the message: word count, character count, \
sentence count, detected language, and tone (formal, informal, or neutral). \
Present the numbers as a short structured list."
        }
        TaskKind::Summarization => {
            "Summarize the text in the message. Keep the main ideas and the \
original tone, and end with one line noting the original and summary word \
counts."
        }
        TaskKind::LanguageDetection => {
            "Identify the language of the message text, with a confidence \
estimate and the clues that support it. Mention any mixed-in languages."
        }
    }
}

/// Build the instruction block for a vision turn.
pub fn compose_vision(user_text: &str, now: DateTime<Local>) -> String {
    format!(
        "[IMAGE ANALYSIS]\n\
Local time: {time}\n\
\n\
User message: {user_text}\n\
\n\
Analyze the attached image:\n\
1. Main objects, composition, and colors.\n\
2. Read all visible text and translate anything not in the user's language.\n\
3. Context: what setting, purpose, or situation does the image suggest?\n\
Answer in the user's language, structured by the sections above.\n",
        time = now.format(TIME_FORMAT),
    )
}

/// Wrap a composed prompt with the tool table and the decision protocol.
pub fn decision_prompt<'a>(
    composed: &str,
    tools: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut prompt = String::from(composed);

    prompt.push_str("\n[AVAILABLE TOOLS]\n");
    for (name, description) in tools {
        prompt.push_str(&format!("- {name}: {description}\n"));
    }

    prompt.push_str(
        "\n[DECISION]\n\
If exactly one tool above would clearly improve the answer, reply with a \
single JSON object: {\"tool\": \"<name>\", \"argument\": \"<text argument>\"}. \
Otherwise reply with the answer itself, either as plain text or as \
{\"reply\": \"<answer>\"}. Never mention this decision step.\n",
    );

    prompt
}

/// Build the final completion prompt after a tool ran.
pub fn tool_followup(user_text: &str, tool_name: &str, tool_output: &str) -> String {
    format!(
        "[TOOL RESULT]\n\
Tool `{tool_name}` returned:\n\
{tool_output}\n\
\n\
[USER MESSAGE]\n\
{user_text}\n\
\n\
[TASK]\n\
Write the final answer to the user's message using the tool result above. \
Answer in the user's language and do not mention the tool.\n",
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn classify_recognizes_turkish_and_english_triggers() {
        assert_eq!(classify("Saat kaç?"), TaskKind::TimeQuery);
        assert_eq!(classify("What time is it?"), TaskKind::TimeQuery);
        assert_eq!(classify("Bu metni özetle"), TaskKind::Summarization);
        assert_eq!(classify("analyze this paragraph"), TaskKind::TextAnalysis);
        assert_eq!(classify("hangi dilde yazılmış?"), TaskKind::LanguageDetection);
        assert_eq!(classify("Merhaba, nasılsın?"), TaskKind::GeneralChat);
    }

    #[test]
    fn time_queries_embed_the_literal_timestamp() {
        let now = fixed_now();
        let prompt = compose(TaskKind::TimeQuery, "Saat kaç?", &[], false, now);
        assert!(prompt.contains(&now.format(TIME_FORMAT).to_string()));
        assert!(prompt.contains("Saat kaç?"));
    }

    #[test]
    fn composition_is_deterministic_at_one_instant() {
        let now = fixed_now();
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let a = compose(TaskKind::GeneralChat, "how are you?", &history, false, now);
        let b = compose(TaskKind::GeneralChat, "how are you?", &history, false, now);
        assert_eq!(a, b);
    }

    #[test]
    fn history_lines_are_role_tagged_and_truncated() {
        let long = "x".repeat(600);
        let history = vec![Message::user(long)];
        let prompt = compose(TaskKind::GeneralChat, "next", &history, false, fixed_now());

        let line = prompt
            .lines()
            .find(|l| l.starts_with("user: "))
            .expect("history line");
        assert_eq!(line.chars().count(), "user: ".len() + 500);
    }

    #[test]
    fn image_section_appears_only_when_requested() {
        let with = compose(TaskKind::GeneralChat, "look", &[], true, fixed_now());
        let without = compose(TaskKind::GeneralChat, "look", &[], false, fixed_now());
        assert!(with.contains("[IMAGE]"));
        assert!(!without.contains("[IMAGE]"));
    }

    #[test]
    fn decision_prompt_lists_every_tool() {
        let tools = [
            ("current_time", "tells the time"),
            ("text_summarizer", "summarizes text"),
        ];
        let prompt = decision_prompt("base", tools);
        assert!(prompt.contains("- current_time: tells the time"));
        assert!(prompt.contains("- text_summarizer: summarizes text"));
        assert!(prompt.contains("[DECISION]"));
        assert!(prompt.starts_with("base"));
    }

    #[test]
    fn vision_prompt_carries_user_text_and_time() {
        let now = fixed_now();
        let prompt = compose_vision("Bu görselde ne var?", now);
        assert!(prompt.contains("Bu görselde ne var?"));
        assert!(prompt.contains(&now.format(TIME_FORMAT).to_string()));
    }

    #[test]
    fn tool_followup_names_the_tool_and_question() {
        let prompt = tool_followup("Saat kaç?", "current_time", "14:30");
        assert!(prompt.contains("`current_time`"));
        assert!(prompt.contains("14:30"));
        assert!(prompt.contains("Saat kaç?"));
    }
}
