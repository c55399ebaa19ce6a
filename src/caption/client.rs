//! Caption client with bounded, fixed-delay retry.
//!
//! The image file is read and base64-encoded once, then up to
//! `max_retries` attempts are made against the backend with a fixed
//! `retry_delay` between them (no delay after the last attempt). A caller
//! that gets an empty string back must treat it as "no caption produced".

use std::path::Path;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use tracing::{error, info, warn};

use crate::caption::backend::{CaptionRequest, VisionBackend};
use crate::caption::prompt::{self, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE, USER_PROMPT};
use crate::error::{CaptionerError, CaptionerResult};

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn validate(&self) -> CaptionerResult<()> {
        if self.max_retries == 0 {
            return Err(CaptionerError::config("max_retries", "0", "must be at least 1"));
        }
        Ok(())
    }
}

/// Waits between attempts.
pub trait Backoff {
    fn wait(&self, delay: Duration);
}

impl<T: Backoff + ?Sized> Backoff for &T {
    fn wait(&self, delay: Duration) {
        (**self).wait(delay)
    }
}

/// Blocks the current thread for the delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Backoff for ThreadSleep {
    fn wait(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

pub struct CaptionClient<B, S = ThreadSleep> {
    backend: B,
    backoff: S,
    policy: RetryPolicy,
}

impl<B: VisionBackend> CaptionClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            backoff: ThreadSleep,
            policy: RetryPolicy::default(),
        }
    }
}

impl<B: VisionBackend, S: Backoff> CaptionClient<B, S> {
    /// Replace the wait strategy between attempts.
    pub fn with_backoff<T: Backoff>(self, backoff: T) -> CaptionClient<B, T> {
        CaptionClient {
            backend: self.backend,
            backoff,
            policy: self.policy,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Caption `image_path` using the client's retry policy.
    ///
    /// Returns an empty string when every attempt failed.
    pub fn caption(&self, image_path: &Path, prefix: &str, suffix: &str) -> String {
        self.caption_with(image_path, prefix, suffix, self.policy)
    }

    /// Caption `image_path` with an explicit retry policy.
    pub fn caption_with(
        &self,
        image_path: &Path,
        prefix: &str,
        suffix: &str,
        policy: RetryPolicy,
    ) -> String {
        match self.try_caption(image_path, prefix, suffix, policy) {
            Ok(caption) => caption,
            Err(e) => {
                error!(
                    file = %image_path.display(),
                    category = e.category(),
                    "All attempts failed: {e}"
                );
                String::new()
            }
        }
    }

    /// Caption `image_path`, returning the last attempt's error if none succeeded.
    pub fn try_caption(
        &self,
        image_path: &Path,
        prefix: &str,
        suffix: &str,
        policy: RetryPolicy,
    ) -> CaptionerResult<String> {
        let image_base64 = encode_image(image_path)?;
        let request = CaptionRequest {
            system_prompt: SYSTEM_PROMPT,
            user_prompt: USER_PROMPT,
            image_base64: &image_base64,
            mime_type: mime_for(image_path),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let attempts = policy.max_retries.max(1);
        let mut attempt = 1;
        loop {
            let outcome = self.backend.describe(&request).and_then(|raw| {
                if prompt::clean(&raw).is_empty() {
                    Err(CaptionerError::malformed("caption is empty after cleanup"))
                } else {
                    Ok(raw)
                }
            });
            match outcome {
                Ok(raw) => return Ok(prompt::format_caption(&raw, prefix, suffix)),
                Err(e) if attempt < attempts => {
                    warn!(
                        file = %image_path.display(),
                        attempt,
                        category = e.category(),
                        "Attempt {attempt} failed: {e}"
                    );
                    info!("Retrying in {} seconds...", policy.retry_delay.as_secs_f32());
                    self.backoff.wait(policy.retry_delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Read an image file and encode it with the standard base64 alphabet.
pub fn encode_image(path: &Path) -> CaptionerResult<String> {
    let bytes = std::fs::read(path).map_err(|e| CaptionerError::io("read image", path, e))?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// MIME type advertised in the data URL, from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_policy_is_three_attempts_five_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
        assert!(policy.validate().is_ok());
        assert!(RetryPolicy::new(0, Duration::ZERO).validate().is_err());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(&PathBuf::from("image0.jpg")), "image/jpeg");
        assert_eq!(mime_for(&PathBuf::from("image0.PNG")), "image/png");
        assert_eq!(mime_for(&PathBuf::from("noext")), "image/jpeg");
    }

    #[test]
    fn encode_reports_missing_file() {
        let err = encode_image(&PathBuf::from("/definitely/not/here.jpg")).unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
