//! Provider clients for the remote model APIs
//!
//! One outbound HTTPS call per invocation, a bounded timeout, and no
//! internal retries; callers own the retry/fallback policy. The `Provider`
//! trait is the seam the orchestrator and tools are tested through.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse, VisionRequest, VisionResponse};
use crate::core::credentials::Credentials;
use crate::utils::image::encode_for_upload;
use crate::utils::url::construct_api_url;

/// Upper bound for any single network call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum ProviderError {
    /// Rejected credentials, or a vision request without a configured key.
    Auth(String),
    /// HTTP 429 from the remote API.
    RateLimited(String),
    /// Any other unsuccessful HTTP status.
    Api { status: u16, message: String },
    /// Connection, TLS, or timeout failure before a response arrived.
    Network(String),
    /// A 2xx response whose body did not match the documented shape.
    MalformedResponse(String),
    /// Upload bytes that do not decode to a raster image.
    InvalidImage(String),
    /// A request the caller built incorrectly (e.g. no messages).
    InvalidRequest(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "authentication failed: {msg}"),
            ProviderError::RateLimited(msg) => write!(f, "rate limited: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API request failed with status {status}: {message}")
            }
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            ProviderError::InvalidImage(msg) => write!(f, "{msg}"),
            ProviderError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, ProviderError::InvalidImage(_))
    }
}

/// Outbound calls to the remote chat and vision APIs.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError>;

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &[u8],
        model: &str,
    ) -> Result<String, ProviderError>;
}

pub struct HttpProvider {
    client: reqwest::Client,
    credentials: Credentials,
}

impl HttpProvider {
    pub fn new(credentials: Credentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        if messages.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens,
            temperature,
        };

        let chat_url = construct_api_url(&self.credentials.chat_base_url, "chat/completions");
        debug!(model, url = %chat_url, "sending chat completion request");

        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.chat_api_key),
            )
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(map_status_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        first_choice_content(parsed)
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &[u8],
        model: &str,
    ) -> Result<String, ProviderError> {
        // Validate before touching the network or the key; bad bytes must
        // fail the same way whether or not vision is configured.
        let encoded =
            encode_for_upload(image).map_err(|e| ProviderError::InvalidImage(e.to_string()))?;

        let api_key = self.credentials.vision_api_key.as_deref().ok_or_else(|| {
            ProviderError::Auth(
                "GEMINI_API_KEY is not set; image analysis is unavailable".to_string(),
            )
        })?;

        let endpoint = format!("{}:generateContent", vision_model_path(model));
        let vision_url = construct_api_url(&self.credentials.vision_base_url, &endpoint);
        debug!(model, url = %vision_url, "sending vision request");

        let request = VisionRequest::for_prompt(prompt, &encoded);
        let response = self
            .client
            .post(vision_url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(map_status_error(status.as_u16(), &body));
        }

        let parsed: VisionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        first_candidate_text(parsed)
    }
}

/// The model path segment for the vision endpoint. Bare ids get the
/// `models/` prefix; ids that already carry it pass through.
pub fn vision_model_path(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Network(format!("request timed out: {err}"))
    } else {
        ProviderError::Network(err.to_string())
    }
}

fn map_status_error(status: u16, body: &str) -> ProviderError {
    let message = extract_error_summary(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "<empty body>".to_string()
        } else {
            trimmed.to_string()
        }
    });

    match status {
        401 | 403 => ProviderError::Auth(message),
        429 => ProviderError::RateLimited(message),
        _ => ProviderError::Api { status, message },
    }
}

/// Pull a human-readable summary out of a JSON error body. The two APIs
/// disagree about where the message lives, so a few locations are probed.
fn extract_error_summary(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;

    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn first_choice_content(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no completion text".to_string())
        })
}

fn first_candidate_text(response: VisionResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no candidate text".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials(vision_key: Option<&str>) -> Credentials {
        Credentials {
            chat_api_key: "gsk-test".to_string(),
            chat_base_url: "https://chat.test/v1".to_string(),
            vision_api_key: vision_key.map(str::to_string),
            vision_base_url: "https://vision.test/v1beta".to_string(),
        }
    }

    #[test]
    fn vision_model_path_adds_the_prefix_once() {
        assert_eq!(
            vision_model_path("gemini-2.0-flash-lite"),
            "models/gemini-2.0-flash-lite"
        );
        assert_eq!(
            vision_model_path("models/gemini-2.0-flash-lite"),
            "models/gemini-2.0-flash-lite"
        );
        assert_eq!(vision_model_path("  gemini-2.0-flash-lite "), "models/gemini-2.0-flash-lite");
    }

    #[test]
    fn status_errors_map_onto_the_taxonomy() {
        assert!(matches!(
            map_status_error(401, r#"{"error":{"message":"bad key"}}"#),
            ProviderError::Auth(msg) if msg == "bad key"
        ));
        assert!(matches!(
            map_status_error(429, "slow down"),
            ProviderError::RateLimited(msg) if msg == "slow down"
        ));
        assert!(matches!(
            map_status_error(500, ""),
            ProviderError::Api { status: 500, message } if message == "<empty body>"
        ));
    }

    #[test]
    fn error_summary_probes_both_api_shapes() {
        assert_eq!(
            extract_error_summary(r#"{"error":{"message":"model   overloaded"}}"#).as_deref(),
            Some("model overloaded")
        );
        assert_eq!(
            extract_error_summary(r#"{"error":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            extract_error_summary(r#"{"message":"not found"}"#).as_deref(),
            Some("not found")
        );
        assert_eq!(extract_error_summary("not json"), None);
    }

    #[test]
    fn empty_completions_are_malformed() {
        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("parse");
        assert!(matches!(
            first_choice_content(empty),
            Err(ProviderError::MalformedResponse(_))
        ));

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":""}}]}"#).expect("parse");
        assert!(matches!(
            first_choice_content(blank),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn vision_text_is_pulled_from_the_first_part() {
        let parsed: VisionResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a cat"},{"text":"ignored"}]}}]}"#,
        )
        .expect("parse");
        assert_eq!(first_candidate_text(parsed).expect("text"), "a cat");

        let empty: VisionResponse = serde_json::from_str(r#"{"candidates":[]}"#).expect("parse");
        assert!(matches!(
            first_candidate_text(empty),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn empty_message_list_is_rejected_before_any_network_call() {
        let provider = HttpProvider::new(test_credentials(None));
        let err = provider
            .complete(&[], "llama-3.3-70b-versatile", 128, 0.7)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn undecodable_image_fails_before_any_network_call() {
        let provider = HttpProvider::new(test_credentials(Some("g-test")));
        let err = provider
            .analyze_image("describe", b"not an image", "gemini-2.0-flash-lite")
            .await
            .expect_err("must fail");
        assert!(err.is_invalid_image());
    }

    #[tokio::test]
    async fn missing_vision_key_reports_auth_failure() {
        let provider = HttpProvider::new(test_credentials(None));
        // A valid image so validation passes and the key check is reached.
        let image = crate::utils::test_utils::tiny_png();
        let err = provider
            .analyze_image("describe", &image, "gemini-2.0-flash-lite")
            .await
            .expect_err("must fail");
        assert!(matches!(err, ProviderError::Auth(msg) if msg.contains("GEMINI_API_KEY")));
    }
}
