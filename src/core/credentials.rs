use std::error::Error;
use std::fmt;

const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const QUICK_FIXES: &[&str] = &[
    "export GROQ_API_KEY=gsk-...       # Required for chat completions",
    "export GEMINI_API_KEY=...         # Optional, enables image analysis",
    "export GROQ_BASE_URL=...          # Optional endpoint override",
];

/// Resolved API credentials for one process lifetime.
///
/// The chat key is mandatory; the vision key is optional and its absence
/// only disables image turns, it is not a startup failure.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub chat_api_key: String,
    pub chat_base_url: String,
    pub vision_api_key: Option<String>,
    pub vision_base_url: String,
}

#[derive(Debug)]
pub struct CredentialsError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl CredentialsError {
    pub fn missing_chat_key() -> Self {
        Self {
            message: "No GROQ_API_KEY set in the environment.\n\nThe chat completion API \
requires an API key; without it the assistant cannot start."
                .to_string(),
            quick_fixes: QUICK_FIXES,
            exit_code: 2,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CredentialsError {}

/// Read credentials from the process environment.
pub fn resolve_env_credentials() -> Result<Credentials, CredentialsError> {
    resolve_with(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
}

/// Resolution against an arbitrary lookup, so tests never mutate the real
/// process environment.
pub fn resolve_with<F>(get: F) -> Result<Credentials, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    let chat_api_key = get("GROQ_API_KEY").ok_or_else(CredentialsError::missing_chat_key)?;

    Ok(Credentials {
        chat_api_key,
        chat_base_url: get("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string()),
        vision_api_key: get("GEMINI_API_KEY"),
        vision_base_url: get("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_VISION_BASE_URL.to_string()),
    })
}
