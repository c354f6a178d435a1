//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`, plus the CLI
//! and HTTP sinks.

pub mod image_generator;
pub mod slot_sink;

pub use image_generator::{GeneratedImage, GenerationRequest, ImageGenerator};
pub use slot_sink::SlotSink;
