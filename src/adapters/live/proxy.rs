//! Client adapter that generates through an `imagegen serve` backend.
//!
//! The client never holds the upstream credential; each slot is one
//! `POST /generate` with `count: 1`.

use reqwest::Client;
use serde::Deserialize;

use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};

/// Generator that forwards each slot to the proxy server.
pub struct ProxyGenerator {
    client: Client,
    endpoint: String,
}

impl ProxyGenerator {
    /// Create a proxy generator for the server at `server_url`.
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        let endpoint = format!("{}/generate", server_url.trim_end_matches('/'));
        Self { client: Client::new(), endpoint }
    }
}

impl ImageGenerator for ProxyGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let body = serde_json::json!({
            "prompt": request.prompt,
            "width": request.width,
            "height": request.height,
            "count": 1,
        });
        Box::pin(async move {
            let response = self.client.post(&self.endpoint).json(&body).send().await?;
            let status = response.status();
            let text = response.text().await?;
            decode_response(status.as_u16(), &text)
        })
    }
}

#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    images: Vec<String>,
    error: Option<String>,
    details: Option<String>,
    message: Option<String>,
}

fn decode_response(status: u16, text: &str) -> Result<GeneratedImage, ImageError> {
    let parsed: ProxyResponse = serde_json::from_str(text).map_err(|e| ImageError::Upstream {
        status,
        message: format!("Unexpected response from server: {e}"),
    })?;

    if (200..300).contains(&status) {
        if let Some(uri) = parsed.images.first() {
            return GeneratedImage::from_data_uri(uri);
        }
    }

    let message = parsed
        .details
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| "Failed to generate".to_string());
    Err(ImageError::Upstream { status, message })
}
