//! # Configuration Module
//!
//! Run options for one pipeline invocation and the inference credentials read
//! from the environment.

pub mod config;
pub mod credentials;

pub use config::RunConfig;
pub use credentials::AzureCredentials;
