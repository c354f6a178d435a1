//! Image generator port for a single upstream generation call.

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// One slot's worth of work: generate a single image for a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Requested width in pixels.
    pub width: u32,
    /// Requested height in pixels.
    pub height: u32,
    /// Slot position within the batch (`0..count`).
    pub index: usize,
}

/// A single generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes (decoded from base64).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
}

impl GeneratedImage {
    /// Render the image as a `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{encoded}", self.mime_type)
    }

    /// Parse a base64 `data:` URI back into an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not a base64 data URI or the payload
    /// does not decode.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let malformed = || ImageError::Upstream {
            status: 200,
            message: "Malformed image data URI".to_string(),
        };
        let rest = uri.strip_prefix("data:").ok_or_else(malformed)?;
        let (mime_type, payload) = rest.split_once(";base64,").ok_or_else(malformed)?;
        let data = base64::engine::general_purpose::STANDARD.decode(payload).map_err(|e| {
            ImageError::Upstream { status: 200, message: format!("Failed to decode base64: {e}") }
        })?;
        Ok(Self { data, mime_type: mime_type.to_string() })
    }
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<GeneratedImage, ImageError>> + Send + 'a>>;

/// Generates one image from a text prompt via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Generate the image for the given slot request.
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_rendering() {
        let image = GeneratedImage { data: vec![1, 2, 3], mime_type: "image/png".into() };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn data_uri_parsing() {
        let image = GeneratedImage::from_data_uri("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn data_uri_rejects_plain_urls() {
        assert!(GeneratedImage::from_data_uri("https://example.com/cat.png").is_err());
        assert!(GeneratedImage::from_data_uri("data:image/png,rawdata").is_err());
        assert!(GeneratedImage::from_data_uri("data:image/png;base64,***").is_err());
    }

    #[test]
    fn generated_image_serializes_data_as_base64() {
        let image = GeneratedImage { data: vec![0xFF, 0xD8, 0xFF, 0xE0], mime_type: "image/jpeg".into() };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "/9j/4A==");
        let back: GeneratedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }
}
