//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};

/// Serves recorded slot results from a cassette, one per call.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(&self, _request: &GenerationRequest) -> GenerateFuture<'_> {
        // Claimed at call time so slots consume interactions in dispatch order.
        let output = next_output(&self.replayer, "image_generator", "generate");
        Box::pin(async move {
            let output = output.map_err(|message| ImageError::Upstream { status: 0, message })?;
            replay_result::<GeneratedImage>(output)
                .map_err(|e| ImageError::Upstream { status: 0, message: e.to_string() })
        })
    }
}
