//! # Preprocessing Module
//!
//! Normalizes arbitrary input images into fixed-size letterboxed canvases.

pub mod preprocessor;

pub use preprocessor::{OutputFormat, PreprocessConfig, Preprocessor, processed_filename};
