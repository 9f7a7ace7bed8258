//! Vision model OCR for roster photos

use crate::ollama::{ChatMessage, ChatRequest, OllamaClient};
use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use core_pipeline::OcrEngine;
use tracing::debug;

/// Default vision model
pub const DEFAULT_VISION_MODEL: &str = "qwen2.5vl:7b";

/// OCR engine that asks an Ollama vision model to transcribe the roster
pub struct VisionOcr {
    client: OllamaClient,
    model_name: String,
}

impl VisionOcr {
    /// Create a new vision OCR engine
    pub fn new(client: OllamaClient, model_name: String) -> Self {
        Self { client, model_name }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn build_request(&self, image: &[u8], languages: &str) -> ChatRequest {
        let image_b64 = general_purpose::STANDARD.encode(image);

        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: transcription_prompt(languages),
                images: Some(vec![image_b64]),
            }],
            stream: Some(false),
        }
    }
}

fn transcription_prompt(languages: &str) -> String {
    format!(
        r#"This photo shows an ambulance dispatch roster.
Transcribe it line by line, one roster entry per output line.
Keep unit codes (such as AB-101) and names exactly as written.
Languages present: {}.
Return only the transcribed text, no commentary."#,
        languages.replace('+', ", ")
    )
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn recognize(&self, image: &[u8], languages: &str) -> Result<String> {
        let request = self.build_request(image, languages);
        let response = self.client.chat(request).await?;
        debug!(
            model = %response.model,
            chars = response.message.content.len(),
            "vision transcription finished"
        );
        Ok(response.message.content)
    }
}
