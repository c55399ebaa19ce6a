//! # Caption Module
//!
//! Turns a processed image into a short training caption via a remote
//! vision-language model.
//!
//! - [`prompt`]: style guide sent with every request and caption formatting
//! - [`types`]: chat-completions wire types
//! - [`backend`]: transport seam ([`VisionBackend`]) and the Azure OpenAI backend
//! - [`client`]: bounded retry around one backend call

pub mod backend;
pub mod client;
pub mod prompt;
pub mod types;

pub use backend::{AzureOpenAiBackend, CaptionRequest, VisionBackend};
pub use client::{Backoff, CaptionClient, RetryPolicy, ThreadSleep};
pub use prompt::format_caption;
