//! Adapter implementations for the [`ImageGenerator`](crate::ports::ImageGenerator) port.
//!
//! - `live/`: Gemini upstream, and the client-side proxy to `imagegen serve`
//! - `recording/`: wraps a live adapter and records each slot to a cassette
//! - `replaying/`: serves recorded slots back with no network I/O

pub mod live;
pub mod recording;
pub mod replaying;
