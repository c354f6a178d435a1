//! Where generated images land on disk, and the CLI's per-slot file sink.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::batch::GenerationResult;
use crate::error::ImageError;
use crate::params::OutputFormat;
use crate::ports::{GeneratedImage, SlotSink};

/// Longest prompt-derived stem used in an auto-generated filename.
const SLUG_LEN: usize = 50;

/// Turn a prompt into a lowercase, hyphen-separated filename stem.
///
/// Runs of non-alphanumeric characters collapse into one hyphen. Falls back
/// to `"image"` when nothing usable remains.
#[must_use]
pub fn slugify(input: &str, max_len: usize) -> String {
    let words: Vec<String> = input
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    let mut slug = words.join("-");
    slug.truncate(max_len);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

/// Base output path: the explicit `--output`, or `<slug>-<unix secs>.<ext>`.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str, format: OutputFormat) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    let stamp = chrono::Utc::now().timestamp();
    PathBuf::from(format!("{}-{stamp}.{}", slugify(prompt, SLUG_LEN), format.extension()))
}

/// Path for one slot: the base path itself for a single image, otherwise
/// `<stem>-<n>.<ext>` with `n` counted from 1.
#[must_use]
pub fn slot_output_path(base_path: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return base_path.to_path_buf();
    }
    let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base_path.extension().unwrap_or_default().to_string_lossy();
    base_path.with_file_name(format!("{stem}-{}.{ext}", index + 1))
}

/// Write `image` to `path` in `format`, re-encoding when the upstream sent
/// something else.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded or the file cannot be
/// written.
pub fn write_image(image: &GeneratedImage, format: OutputFormat, path: &Path) -> Result<(), ImageError> {
    let source_mime = image.mime_type.split(';').next().unwrap_or_default().trim();
    if source_mime == format.mime_type() {
        return std::fs::write(path, &image.data).map_err(ImageError::Io);
    }

    tracing::debug!(from = source_mime, to = %format, "re-encoding image");
    let decoded = image::load_from_memory(&image.data)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode {source_mime}: {e}")))?;
    decoded
        .save_with_format(path, format.image_format())
        .map_err(|e| ImageError::ImageConversion(format!("Failed to save as {format}: {e}")))
}

/// Writes each slot's image to disk the moment it arrives.
pub struct FileSink {
    base_path: PathBuf,
    format: OutputFormat,
    count: usize,
    saved: Mutex<Vec<PathBuf>>,
}

impl FileSink {
    /// Create a sink writing `count` slots derived from `base_path`.
    #[must_use]
    pub fn new(base_path: PathBuf, format: OutputFormat, count: usize) -> Self {
        Self { base_path, format, count, saved: Mutex::new(Vec::new()) }
    }

    /// Files written so far, in arrival order.
    #[must_use]
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SlotSink for FileSink {
    fn on_slot_resolved(&self, result: &GenerationResult) {
        let slot = result.index() + 1;
        match result {
            GenerationResult::Success { index, image } => {
                let path = slot_output_path(&self.base_path, *index, self.count);
                match write_image(image, self.format, &path) {
                    Ok(()) => {
                        eprintln!("Saved: {}", path.display());
                        if let Ok(mut saved) = self.saved.lock() {
                            saved.push(path);
                        }
                    }
                    Err(e) => eprintln!("Slot {slot} failed: {e}"),
                }
            }
            GenerationResult::Failure { message, .. } => eprintln!("Slot {slot} failed: {message}"),
        }
    }
}
