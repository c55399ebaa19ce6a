//! Azure OpenAI credentials resolved from the process environment.
//!
//! The binary loads a `.env` file first (via `dotenv`) so the same variables
//! can live next to the working directory instead of the shell profile.

use crate::error::{CaptionerError, CaptionerResult};

pub const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";

/// API version used when `AZURE_OPENAI_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Everything needed to reach one chat-completions deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureCredentials {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AzureCredentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> CaptionerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through `lookup`, reporting every missing variable at once.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> CaptionerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = read(API_KEY_VAR);
        let endpoint = read(ENDPOINT_VAR);
        let deployment = read(DEPLOYMENT_VAR);

        let missing: Vec<String> = [
            (API_KEY_VAR, api_key.is_none()),
            (ENDPOINT_VAR, endpoint.is_none()),
            (DEPLOYMENT_VAR, deployment.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name.to_string())
        .collect();

        match (api_key, endpoint, deployment) {
            (Some(api_key), Some(endpoint), Some(deployment)) => Ok(Self {
                api_key,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                deployment,
                api_version: read(API_VERSION_VAR)
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            }),
            _ => Err(CaptionerError::MissingEnv { names: missing }),
        }
    }

    /// Full chat-completions URL for this deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}
