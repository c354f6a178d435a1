//! Live adapters that talk to real HTTP endpoints.

pub mod gemini;
pub mod proxy;
