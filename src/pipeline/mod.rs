//! # Pipeline Module
//!
//! Sequential orchestration: discover → preprocess → caption → persist,
//! one image at a time.

pub mod discover;
pub mod orchestrator;

pub use discover::{IMAGE_EXTENSIONS, discover_images, is_image};
pub use orchestrator::{Pipeline, RunSummary};
