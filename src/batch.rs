//! Batch fan-out: one prompt, `count` independent upstream calls.

use std::sync::Arc;

use futures::future::join_all;

use crate::dimensions::Dimensions;
use crate::error::ImageError;
use crate::ports::{GeneratedImage, GenerationRequest, ImageGenerator, SlotSink};

/// A batch submission: the same prompt and dimensions for every slot.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// The text prompt.
    pub prompt: String,
    /// Resolved pixel dimensions.
    pub dimensions: Dimensions,
    /// Number of slots to generate.
    pub count: usize,
}

/// The settled outcome of one slot.
#[derive(Debug, Clone)]
pub enum GenerationResult {
    /// The upstream returned an image.
    Success {
        /// Slot index.
        index: usize,
        /// The generated artifact.
        image: GeneratedImage,
    },
    /// The upstream call failed or returned no image.
    Failure {
        /// Slot index.
        index: usize,
        /// What went wrong, suitable for display.
        message: String,
    },
}

impl GenerationResult {
    /// Slot index this result belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } | Self::Failure { index, .. } => *index,
        }
    }

    /// The image, if the slot succeeded.
    #[must_use]
    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Success { image, .. } => Some(image),
            Self::Failure { .. } => None,
        }
    }
}

/// Fires one upstream call per slot and collects every outcome.
pub struct BatchGenerator {
    generator: Arc<dyn ImageGenerator>,
}

impl BatchGenerator {
    /// Create a batch generator over the given upstream port.
    #[must_use]
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    /// Generate every slot of `request`, reporting each to `sink` as it settles.
    ///
    /// All calls are started before any is awaited. A failing slot never
    /// cancels its siblings; its error is captured as
    /// [`GenerationResult::Failure`]. The returned results are in index order.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Validation`] if the prompt is blank. No upstream
    /// call is made in that case.
    pub async fn generate(
        &self,
        request: &BatchRequest,
        sink: &dyn SlotSink,
    ) -> Result<Vec<GenerationResult>, ImageError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ImageError::Validation("Prompt is required".to_string()));
        }

        tracing::debug!(
            count = request.count,
            dimensions = %request.dimensions,
            "dispatching batch"
        );

        let slots = (0..request.count).map(|index| {
            let slot = GenerationRequest {
                prompt: prompt.to_string(),
                width: request.dimensions.width,
                height: request.dimensions.height,
                index,
            };
            let pending = self.generator.generate(&slot);
            async move {
                let result = match pending.await {
                    Ok(image) => GenerationResult::Success { index, image },
                    Err(e) => {
                        tracing::warn!(index, error = %e, "slot failed");
                        GenerationResult::Failure { index, message: e.slot_message() }
                    }
                };
                sink.on_slot_resolved(&result);
                result
            }
        });

        Ok(join_all(slots).await)
    }
}
