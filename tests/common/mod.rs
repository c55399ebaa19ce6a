//! Common test utilities and helpers for the captioner tests
//!
//! Provides a scripted vision backend, a backoff that records instead of
//! sleeping, and helpers that write synthetic input images.

#![allow(dead_code)]


/// Vision backend and backoff doubles
pub mod fake_backend {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    use dataset_captioner::caption::{Backoff, CaptionRequest, VisionBackend};
    use dataset_captioner::{CaptionerError, CaptionerResult};

    /// What the backend saw for one call
    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub system_prompt: String,
        pub user_prompt: String,
        pub image_base64: String,
        pub mime_type: String,
        pub max_tokens: u32,
        pub temperature: f32,
    }

    /// Backend that replays queued outcomes, then falls back to a fixed answer
    pub struct ScriptedBackend {
        script: RefCell<VecDeque<CaptionerResult<String>>>,
        fallback: Option<String>,
        numbered: bool,
        calls: Cell<usize>,
        seen: RefCell<Vec<SeenRequest>>,
    }

    impl ScriptedBackend {
        /// Always answer `text`
        pub fn always(text: &str) -> Self {
            Self::new(Vec::new(), Some(text.to_string()), false)
        }

        /// Answer `"{prefix} {n}"` where n counts calls from zero
        pub fn numbered(prefix: &str) -> Self {
            Self::new(Vec::new(), Some(prefix.to_string()), true)
        }

        /// Replay `outcomes`, then fail every further call
        pub fn scripted(outcomes: Vec<CaptionerResult<String>>) -> Self {
            Self::new(outcomes, None, false)
        }

        /// Replay `outcomes`, then answer `text`
        pub fn scripted_then(outcomes: Vec<CaptionerResult<String>>, text: &str) -> Self {
            Self::new(outcomes, Some(text.to_string()), false)
        }

        /// Fail every call
        pub fn failing() -> Self {
            Self::new(Vec::new(), None, false)
        }

        fn new(
            outcomes: Vec<CaptionerResult<String>>,
            fallback: Option<String>,
            numbered: bool,
        ) -> Self {
            Self {
                script: RefCell::new(outcomes.into()),
                fallback,
                numbered,
                calls: Cell::new(0),
                seen: RefCell::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        pub fn seen(&self) -> Vec<SeenRequest> {
            self.seen.borrow().clone()
        }
    }

    impl VisionBackend for ScriptedBackend {
        fn describe(&self, request: &CaptionRequest<'_>) -> CaptionerResult<String> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.seen.borrow_mut().push(SeenRequest {
                system_prompt: request.system_prompt.to_string(),
                user_prompt: request.user_prompt.to_string(),
                image_base64: request.image_base64.to_string(),
                mime_type: request.mime_type.to_string(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            });

            if let Some(outcome) = self.script.borrow_mut().pop_front() {
                return outcome;
            }
            match &self.fallback {
                Some(text) if self.numbered => Ok(format!("{text} {n}")),
                Some(text) => Ok(text.clone()),
                None => Err(server_error()),
            }
        }
    }

    /// A 503 from the service
    pub fn server_error() -> CaptionerError {
        CaptionerError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        }
    }

    /// A request timeout
    pub fn timeout() -> CaptionerError {
        CaptionerError::Timeout {
            operation: "chat completion".to_string(),
            duration_ms: 30_000,
        }
    }

    /// Backoff that records requested delays without sleeping
    #[derive(Default)]
    pub struct RecordingBackoff {
        delays: RefCell<Vec<Duration>>,
    }

    impl RecordingBackoff {
        pub fn delays(&self) -> Vec<Duration> {
            self.delays.borrow().clone()
        }
    }

    impl Backoff for RecordingBackoff {
        fn wait(&self, delay: Duration) {
            self.delays.borrow_mut().push(delay);
        }
    }
}

/// Synthetic input images
pub mod test_images {
    use std::path::{Path, PathBuf};

    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    /// Write a solid RGB image; the format follows the extension of `name`
    pub fn write_solid(dir: &Path, name: &str, w: u32, h: u32, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb(rgb))
            .save(&path)
            .expect("write test image");
        path
    }

    /// Write a half-transparent RGBA PNG
    pub fn write_rgba_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 128]))
            .save(&path)
            .expect("write rgba image");
        path
    }

    /// Write bytes that no decoder accepts under an image extension
    pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"definitely not an image").expect("write corrupt file");
        path
    }

    /// Bounding box `(x, y, w, h)` of pixels brighter than `threshold` on any channel
    pub fn bright_bbox(img: &RgbImage, threshold: u8) -> Option<(u32, u32, u32, u32)> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;
        for (x, y, px) in img.enumerate_pixels() {
            if px.0.iter().any(|&c| c > threshold) {
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}
