//! Live adapter for the Gemini image generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};

/// Default Gemini REST endpoint prefix.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default image-capable Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

const NO_IMAGE_DATA: &str = "No image data received";

/// Live Gemini image generator that calls the Google AI API.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with the given API key and model.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self { client: Client::new(), api_key, model, base_url: GEMINI_API_BASE.to_string() }
    }

    /// Point the generator at a different endpoint prefix.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Prompt text sent upstream; the API takes no structured size, so the
/// dimensions ride along as a hint.
fn prompt_with_size_hint(request: &GenerationRequest) -> String {
    format!("{}. Generate as {}x{} pixel image.", request.prompt, request.width, request.height)
}

fn request_body(request: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{"text": prompt_with_size_hint(request)}]
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"]
        }
    })
}

impl ImageGenerator for GeminiGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let body = request_body(request);
        let index = request.index;
        Box::pin(async move {
            let url = format!("{}/{}:generateContent", self.base_url, self.model);
            tracing::debug!(index, %url, "calling gemini");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(ImageError::Upstream {
                    status: status.as_u16(),
                    message: truncate(&response_text),
                });
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
                ImageError::Upstream { status: 200, message: format!("Failed to parse response: {e}") }
            })?;

            extract_image(parsed)
        })
    }
}

/// Take the first inline image part; otherwise fail with whatever text came back.
fn extract_image(response: GeminiResponse) -> Result<GeneratedImage, ImageError> {
    let mut notes = Vec::new();
    for part in response.candidates.into_iter().flat_map(|c| c.content.parts) {
        if let Some(inline) = part.inline_data.filter(|d| !d.data.is_empty()) {
            let data = base64::engine::general_purpose::STANDARD.decode(&inline.data).map_err(
                |e| ImageError::Upstream {
                    status: 200,
                    message: format!("Failed to decode base64: {e}"),
                },
            )?;
            return Ok(GeneratedImage { data, mime_type: inline.mime_type });
        }
        if let Some(text) = part.text.filter(|t| !t.trim().is_empty()) {
            notes.push(text);
        }
    }

    let message = if notes.is_empty() { NO_IMAGE_DATA.to_string() } else { notes.join(" ") };
    Err(ImageError::Upstream { status: 200, message })
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 500;
    match body.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Default, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[serde(default = "default_mime")]
    mime_type: String,
    #[serde(default)]
    data: String,
}

fn default_mime() -> String {
    "image/png".to_string()
}
