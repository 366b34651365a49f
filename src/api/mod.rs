//! Wire payloads for the two remote APIs
//!
//! The chat endpoint speaks the OpenAI-compatible `chat/completions` shape;
//! the vision endpoint speaks the Gemini `generateContent` shape. Only the
//! fields this crate actually reads or writes are modeled.

use serde::{Deserialize, Serialize};

use crate::core::message::Role;
use crate::utils::image::EncodedImage;

pub mod provider;

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System.as_str().to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User.as_str().to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct VisionRequest {
    pub contents: Vec<VisionContent>,
}

impl VisionRequest {
    /// One text part followed by one inline image part, the only shape
    /// this crate ever sends.
    pub fn for_prompt(prompt: impl Into<String>, image: &EncodedImage) -> Self {
        Self {
            contents: vec![VisionContent {
                parts: vec![
                    VisionPart::text(prompt),
                    VisionPart::inline(image.mime_type, image.base64_data.clone()),
                ],
            }],
        }
    }
}

#[derive(Serialize, Debug)]
pub struct VisionContent {
    pub parts: Vec<VisionPart>,
}

#[derive(Serialize, Debug)]
pub struct VisionPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<VisionInlineData>,
}

impl VisionPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(VisionInlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct VisionInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Deserialize, Debug)]
pub struct VisionResponse {
    #[serde(default)]
    pub candidates: Vec<VisionCandidate>,
}

#[derive(Deserialize, Debug)]
pub struct VisionCandidate {
    pub content: VisionCandidateContent,
}

#[derive(Deserialize, Debug)]
pub struct VisionCandidateContent {
    #[serde(default)]
    pub parts: Vec<VisionCandidatePart>,
}

#[derive(Deserialize, Debug)]
pub struct VisionCandidatePart {
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_the_documented_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            max_tokens: 512,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 512);
    }

    #[test]
    fn vision_request_pairs_text_with_inline_data() {
        let image = EncodedImage {
            mime_type: "image/jpeg",
            base64_data: "aGVsbG8=".to_string(),
        };
        let request = VisionRequest::for_prompt("describe this", &image);
        let value = serde_json::to_value(&request).expect("serialize");

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe this");
        assert!(parts[0].get("inline_data").is_none());
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
        assert!(parts[1].get("text").is_none());
    }

    #[test]
    fn chat_response_parses_the_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"14:30"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("14:30")
        );
    }

    #[test]
    fn vision_response_parses_the_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"a red bicycle"}]}}]}"#;
        let response: VisionResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            response.candidates[0].content.parts[0].text.as_deref(),
            Some("a red bicycle")
        );
    }
}
