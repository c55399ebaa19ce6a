//! Transport seam between the caption client and the inference service.
//!
//! [`VisionBackend`] performs exactly one attempt and reports it as a
//! `Result`; retrying is the client's job. [`AzureOpenAiBackend`] is the
//! production implementation, a blocking `reqwest` client built once and
//! reused for every image.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::caption::types::{
    ChatRequest, ChatResponse, ChatRole, ImageUrl, Message, MessageContent, MessagePart,
};
use crate::config::AzureCredentials;
use crate::error::{CaptionerError, CaptionerResult};

/// Default per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a backend needs to describe one image.
#[derive(Debug, Clone, Copy)]
pub struct CaptionRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    /// Base64 (standard alphabet, padded) of the image file bytes
    pub image_base64: &'a str,
    pub mime_type: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CaptionRequest<'_> {
    /// `data:` URL embedding the image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_base64)
    }

    /// Chat-completions body for this request.
    pub fn to_chat_request(&self) -> ChatRequest {
        ChatRequest {
            messages: vec![
                Message {
                    role: ChatRole::System,
                    content: MessageContent::Text(self.system_prompt.to_string()),
                },
                Message {
                    role: ChatRole::User,
                    content: MessageContent::Parts(vec![
                        MessagePart::Text {
                            text: self.user_prompt.to_string(),
                        },
                        MessagePart::ImageUrl {
                            image_url: ImageUrl { url: self.data_url() },
                        },
                    ]),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// A service that returns a text description for an image.
pub trait VisionBackend {
    /// Make a single attempt. Any error makes the caller retry or give up.
    fn describe(&self, request: &CaptionRequest<'_>) -> CaptionerResult<String>;
}

impl<B: VisionBackend + ?Sized> VisionBackend for &B {
    fn describe(&self, request: &CaptionRequest<'_>) -> CaptionerResult<String> {
        (**self).describe(request)
    }
}

impl<B: VisionBackend + ?Sized> VisionBackend for Box<B> {
    fn describe(&self, request: &CaptionRequest<'_>) -> CaptionerResult<String> {
        (**self).describe(request)
    }
}

/// Azure OpenAI chat-completions deployment.
pub struct AzureOpenAiBackend {
    http: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl AzureOpenAiBackend {
    pub fn new(credentials: &AzureCredentials) -> CaptionerResult<Self> {
        Self::with_timeout(credentials, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        credentials: &AzureCredentials,
        timeout: Duration,
    ) -> CaptionerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CaptionerError::Network {
                operation: "build http client".into(),
                source,
            })?;
        Ok(Self {
            http,
            url: credentials.completions_url(),
            api_key: credentials.api_key.clone(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl VisionBackend for AzureOpenAiBackend {
    fn describe(&self, request: &CaptionRequest<'_>) -> CaptionerResult<String> {
        let body = request.to_chat_request();
        debug!(url = %self.url, bytes = request.image_base64.len(), "Sending caption request");

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| CaptionerError::from_request("chat completion", self.timeout_ms(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptionerError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                CaptionerError::from_request("read completion", self.timeout_ms(), e)
            } else {
                CaptionerError::malformed(format!("invalid response body: {e}"))
            }
        })?;
        parsed.into_text()
    }
}
