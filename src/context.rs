//! Service context that bundles the port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiGenerator;
use crate::adapters::live::proxy::ProxyGenerator;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::error::ImageError;
use crate::ports::ImageGenerator;

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Arc<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette with everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        if recorder.is_empty() {
            tracing::warn!("no interactions recorded; writing an empty cassette");
        } else {
            tracing::debug!(interactions = recorder.len(), "writing cassette");
        }
        recorder.write().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Pick live, recording, or replaying mode from the environment.
    ///
    /// `IMAGEGEN_REPLAY=<path>` serves slots from a cassette and never calls
    /// `live`. `IMAGEGEN_REC=1` wraps the live context with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be built or the cassette
    /// cannot be loaded.
    pub fn from_env(
        live: impl FnOnce() -> Result<Self, ImageError>,
    ) -> Result<(Self, Option<RecordingSession>), ImageError> {
        let replay_path = std::env::var("IMAGEGEN_REPLAY").ok();
        let is_recording = std::env::var("IMAGEGEN_REC").is_ok_and(|v| v == "true" || v == "1");

        if let Some(ref cassette_path) = replay_path {
            tracing::info!(cassette = %cassette_path, "replaying from cassette");
            return Ok((Self::replaying(Path::new(cassette_path))?, None));
        }

        let ctx = live()?;
        if is_recording {
            tracing::info!("recording mode enabled");
            let (ctx, session) = Self::recording(ctx);
            return Ok((ctx, Some(session)));
        }
        Ok((ctx, None))
    }

    /// Create a context that calls Gemini directly. Server side only.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn upstream(config: &Config) -> Result<Self, ImageError> {
        let key = config.gemini_key().ok_or(ImageError::MissingApiKey {
            provider: "Gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        })?;
        let generator = GeminiGenerator::new(key, config.upstream.model.clone())
            .with_base_url(config.upstream.base_url.clone());
        Ok(Self { generator: Arc::new(generator) })
    }

    /// Create a context that generates through an `imagegen serve` proxy.
    #[must_use]
    pub fn proxy(server_url: &str) -> Self {
        Self { generator: Arc::new(ProxyGenerator::new(server_url)) }
    }

    /// Wrap an existing context with a cassette recorder.
    #[must_use]
    pub fn recording(live_ctx: Self) -> (Self, RecordingSession) {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".imagegen/cassettes").join(&timestamp);

        let commit = get_commit_hash();
        let path = output_dir.join("image_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_generator"),
            &commit,
        )));

        let recording_gen = RecordingImageGenerator::new(live_ctx.generator, Arc::clone(&recorder));

        (Self { generator: Arc::new(recording_gen) }, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ImageError> {
        let replayer = CassetteReplayer::from_file(path)
            .map_err(|e| ImageError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self { generator: Arc::new(ReplayingImageGenerator::new(replayer)) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
