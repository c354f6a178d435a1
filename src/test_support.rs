//! Test doubles shared by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use tokio::net::TcpListener;

use crate::batch::GenerationResult;
use crate::error::ImageError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, GenerationRequest, ImageGenerator,
};
use crate::ports::SlotSink;

/// Sink that ignores every notification.
pub struct NoopSink;

impl SlotSink for NoopSink {
    fn on_slot_resolved(&self, _result: &GenerationResult) {}
}

/// Generator that fails the listed slot indices; later indices settle first.
///
/// A successful slot's image data is the prompt bytes, and its MIME type
/// encodes the requested dimensions so tests can see what was asked for.
pub struct FakeGenerator {
    calls: AtomicUsize,
    failing: HashSet<usize>,
    count: usize,
}

impl FakeGenerator {
    pub fn new(count: usize, failing: &[usize]) -> Self {
        Self { calls: AtomicUsize::new(0), failing: failing.iter().copied().collect(), count }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageGenerator for FakeGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let request = request.clone();
        let delay = self.count.saturating_sub(request.index);
        Box::pin(async move {
            for _ in 0..delay {
                tokio::task::yield_now().await;
            }
            if self.failing.contains(&request.index) {
                return Err(ImageError::Upstream {
                    status: 200,
                    message: format!("no image for slot {}", request.index),
                });
            }
            Ok(GeneratedImage {
                data: request.prompt.into_bytes(),
                mime_type: format!("image/png;w={};h={}", request.width, request.height),
            })
        })
    }
}

/// Serve `app` on an ephemeral local port; returns its base URL.
///
/// Clients built after this call reach the stub directly even when an
/// `HTTP_PROXY` is set in the environment.
pub async fn spawn_stub(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a local port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
