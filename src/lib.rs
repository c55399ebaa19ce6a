//! # Dataset Captioner Library
//!
//! Batch-captions images for diffusion-model training datasets. Each image
//! is letterboxed onto a uniform canvas, described by a remote
//! vision-language model and written out as a per-image text file, a CSV
//! row and an entry in a JSON manifest.
//!
//! ## Architecture
//!
//! - `preprocess`: decode, fit-within resize and pad to a fixed canvas
//! - `caption`: one remote inference call wrapped in bounded retry
//! - `dataset`: text, CSV and JSON sinks
//! - `pipeline`: folder discovery and the sequential per-image loop
//! - `config`: run options and credentials
//!
//! ## Example
//!
//! ```rust,no_run
//! use dataset_captioner::caption::{AzureOpenAiBackend, CaptionClient};
//! use dataset_captioner::config::{AzureCredentials, RunConfig};
//! use dataset_captioner::pipeline::Pipeline;
//! use dataset_captioner::preprocess::{PreprocessConfig, Preprocessor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = AzureCredentials::from_env()?;
//! let client = CaptionClient::new(AzureOpenAiBackend::new(&credentials)?);
//! let mut pipeline = Pipeline::new(Preprocessor::new(PreprocessConfig::default()), client);
//!
//! let config = RunConfig::new("input", "output/style")
//!     .with_prefix("in the style of TOK")
//!     .with_suffix("high quality");
//! let summary = pipeline.run(&config)?;
//! println!("captioned {} of {}", summary.captioned, summary.discovered);
//! # Ok(())
//! # }
//! ```

pub mod caption;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod preprocess;

/// Re-export error types for convenience
pub use error::{CaptionerError, CaptionerResult};
