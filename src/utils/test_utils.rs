#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::api::provider::{Provider, ProviderError};
#[cfg(test)]
use crate::api::ChatMessage;
#[cfg(test)]
use crate::utils::image::encode_for_upload;

/// One scripted provider reply.
#[cfg(test)]
#[derive(Clone)]
pub enum StubReply {
    Text(String),
    Fail(String),
}

#[cfg(test)]
#[derive(Clone)]
pub struct CompletionCall {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
#[derive(Clone)]
pub struct ImageCall {
    pub model: String,
    pub prompt: String,
}

/// In-process `Provider` double. Replies are served from a script, then
/// from the default; every call is recorded for assertions.
#[cfg(test)]
pub struct StubProvider {
    script: Mutex<VecDeque<StubReply>>,
    default: StubReply,
    completions: Mutex<Vec<CompletionCall>>,
    images: Mutex<Vec<ImageCall>>,
}

#[cfg(test)]
impl StubProvider {
    pub fn fixed(reply: &str) -> Self {
        Self::with_script(Vec::new(), StubReply::Text(reply.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_script(Vec::new(), StubReply::Fail(message.to_string()))
    }

    pub fn scripted(replies: Vec<StubReply>) -> Self {
        Self::with_script(replies, StubReply::Fail("stub script exhausted".to_string()))
    }

    fn with_script(replies: Vec<StubReply>, default: StubReply) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            default,
            completions: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
        }
    }

    pub fn completion_calls(&self) -> Vec<CompletionCall> {
        self.completions.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<ImageCall> {
        self.images.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, ProviderError> {
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        match reply {
            StubReply::Text(text) => Ok(text),
            StubReply::Fail(message) => Err(ProviderError::Network(message)),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Provider for StubProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        self.completions.lock().unwrap().push(CompletionCall {
            model: model.to_string(),
            max_tokens,
            temperature,
            messages: messages.to_vec(),
        });
        self.next_reply()
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        image: &[u8],
        model: &str,
    ) -> Result<String, ProviderError> {
        // Same contract as the HTTP client: bad bytes fail before anything
        // else happens.
        encode_for_upload(image).map_err(|e| ProviderError::InvalidImage(e.to_string()))?;
        self.images.lock().unwrap().push(ImageCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });
        self.next_reply()
    }
}

/// A minimal valid PNG for exercising image paths.
#[cfg(test)]
pub fn tiny_png() -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("write test png");
    bytes
}
