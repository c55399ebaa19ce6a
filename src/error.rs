//! # Error Handling
//!
//! One error enum covers every failure the captioner can hit, from missing
//! credentials to a malformed completion. The pipeline decides per category
//! whether a failure skips one image or ends the run:
//!
//! - **Preprocessing** (`Decode`, `Scale`, `Encode`): image skipped
//! - **Captioning** (`Network`, `Timeout`, `Api`, `MalformedResponse`): retried, then skipped
//! - **Persistence** (`Io`, `Json`): image skipped; fatal only for run-level sinks
//! - **Configuration** (`MissingEnv`, `Config`): fatal before any work starts
//!
//! ```rust
//! use dataset_captioner::error::CaptionerError;
//!
//! let error = CaptionerError::config("width", "0", "must be greater than 0");
//! assert_eq!(error.category(), "config");
//! assert!(error.is_fatal());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptionerError {
    /// Required environment configuration is absent or blank
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnv { names: Vec<String> },

    /// Run configuration failed validation
    #[error("Configuration error in '{field}': {reason} (value: {value})")]
    Config {
        field: String,
        value: String,
        reason: String,
    },

    /// Source image could not be opened or decoded
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Letterbox resize failed
    #[error("Failed to scale {}: {source}", .path.display())]
    Scale {
        path: PathBuf,
        #[source]
        source: letterbox::ScaleError,
    },

    /// Processed canvas could not be written
    #[error("Failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem errors, tagged with what was being done and where
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure talking to the inference service
    #[error("Network error during {operation}: {source}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the client timeout
    #[error("Timeout during {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Inference service answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Response arrived but did not carry a usable caption
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// Manifest serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using the crate error type
pub type CaptionerResult<T> = Result<T, CaptionerError>;

impl CaptionerError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error for `operation` on `path`
    pub fn io(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a malformed response error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Map a reqwest failure, separating timeouts from other transport errors
    pub fn from_request(
        operation: impl Into<String>,
        timeout_ms: u64,
        source: reqwest::Error,
    ) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                operation: operation.into(),
                duration_ms: timeout_ms,
            }
        } else {
            Self::Network {
                operation: operation.into(),
                source,
            }
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingEnv { .. } => "missing_env",
            Self::Config { .. } => "config",
            Self::Decode { .. } => "decode",
            Self::Scale { .. } => "scale",
            Self::Encode { .. } => "encode",
            Self::Io { .. } => "io",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Api { .. } => "api",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Json(_) => "json",
        }
    }

    /// Configuration problems stop the process before any image is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingEnv { .. } | Self::Config { .. })
    }
}
