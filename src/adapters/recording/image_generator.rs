//! Recording adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::ImageError;
use crate::ports::image_generator::{GenerateFuture, GenerationRequest, ImageGenerator};

/// Records each slot's generation while delegating to an inner implementation.
pub struct RecordingImageGenerator {
    inner: Arc<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Arc<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let request_clone = request.clone();
        let pending = self.inner.generate(request);

        Box::pin(async move {
            let result = pending.await;
            let recorded = result.as_ref().map_err(ImageError::slot_message);
            record_result(&self.recorder, "image_generator", "generate", &request_clone, &recorded);
            result
        })
    }
}
