//! Unified error type for imagegen.

use thiserror::Error;

/// Errors that can occur while generating images or serving requests.
#[derive(Debug, Error)]
pub enum ImageError {
    /// A request failed input validation (e.g. a blank prompt).
    #[error("{0}")]
    Validation(String),

    /// The upstream provider answered without a usable image.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code reported by the upstream.
        status: u16,
        /// Diagnostic text from the upstream.
        message: String,
    },

    /// A network-level failure while talking to the upstream.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// Every slot of a batch failed.
    #[error("All {count} image(s) failed")]
    AllSlotsFailed {
        /// Number of slots requested.
        count: usize,
    },

    /// No API key configured for the upstream provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl ImageError {
    /// Message suitable for showing in a single failed slot.
    ///
    /// Upstream diagnostics are passed through as-is, without the status prefix.
    #[must_use]
    pub fn slot_message(&self) -> String {
        match self {
            Self::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
