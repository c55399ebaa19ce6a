//! # Pipeline Orchestrator
//!
//! Runs one folder through the captioner. Each image is fully preprocessed,
//! captioned and persisted before the next one starts. A failure on one
//! image is logged and that image is skipped; only run-level problems
//! (bad configuration, unreadable input folder, output folder or CSV that
//! cannot be created, manifest write) end the run with an error.
//!
//! Indices follow the sorted listing, so a skipped image leaves a gap in
//! the `image{N}` numbering rather than shifting later images.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::caption::{Backoff, CaptionClient, ThreadSleep, VisionBackend};
use crate::config::RunConfig;
use crate::dataset::{Dataset, DatasetInfo, DatasetWriter, ImageRecord, SinkOptions};
use crate::error::{CaptionerError, CaptionerResult};
use crate::pipeline::discover::discover_images;
use crate::preprocess::Preprocessor;

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Image files found in the input folder
    pub discovered: usize,
    /// Images with a persisted caption
    pub captioned: usize,
    pub preprocess_failures: usize,
    pub caption_failures: usize,
    pub persist_failures: usize,
    /// Path of `dataset.json` if it was written
    pub manifest_path: Option<PathBuf>,
    pub dataset: Dataset,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.preprocess_failures + self.caption_failures + self.persist_failures
    }
}

pub struct Pipeline<B, S = ThreadSleep> {
    preprocessor: Preprocessor,
    client: CaptionClient<B, S>,
}

impl<B: VisionBackend, S: Backoff> Pipeline<B, S> {
    pub fn new(preprocessor: Preprocessor, client: CaptionClient<B, S>) -> Self {
        Self { preprocessor, client }
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn client(&self) -> &CaptionClient<B, S> {
        &self.client
    }

    /// Process every image in `config.input_folder` into `config.output_folder`.
    pub fn run(&mut self, config: &RunConfig) -> CaptionerResult<RunSummary> {
        config.validate()?;
        self.preprocessor.config().validate()?;
        self.client.policy().validate()?;

        let images = discover_images(&config.input_folder)?;

        let output = config.output_folder.as_path();
        std::fs::create_dir_all(output)
            .map_err(|e| CaptionerError::io("create output folder", output, e))?;
        info!(
            input = %config.input_folder.display(),
            output = %output.display(),
            count = images.len(),
            "Found images to caption"
        );

        let pre = *self.preprocessor.config();
        let info = DatasetInfo::new(pre.target_size, pre.output_format.label());
        let mut writer = DatasetWriter::new(output, SinkOptions::from(config), info)?;

        let mut summary = Counters::default();
        let total = images.len();
        for (index, input) in images.iter().enumerate() {
            let original = display_name(input);
            info!(index, "Processing {}/{}: {}", index + 1, total, original);

            let Some(processed) = self.preprocessor.preprocess(input, output, index) else {
                summary.preprocess_failures += 1;
                continue;
            };

            let processed_path = output.join(&processed);
            let caption = self.client.caption(&processed_path, &config.prefix, &config.suffix);
            if caption.is_empty() {
                warn!(file = %original, processed = %processed, "No caption produced, skipping");
                summary.caption_failures += 1;
                continue;
            }

            match writer.record(ImageRecord::new(original.clone(), processed.clone(), caption)) {
                Ok(()) => {
                    info!(file = %original, processed = %processed, "Captioned");
                    summary.captioned += 1;
                }
                Err(e) => {
                    error!(
                        file = %original,
                        category = e.category(),
                        "Failed to persist caption: {e}"
                    );
                    summary.persist_failures += 1;
                }
            }
        }

        let (dataset, manifest_path) = writer.finish()?;
        let summary = RunSummary {
            discovered: total,
            captioned: summary.captioned,
            preprocess_failures: summary.preprocess_failures,
            caption_failures: summary.caption_failures,
            persist_failures: summary.persist_failures,
            manifest_path,
            dataset,
        };
        info!(
            discovered = summary.discovered,
            captioned = summary.captioned,
            skipped = summary.skipped(),
            "Run complete"
        );
        Ok(summary)
    }
}

#[derive(Default)]
struct Counters {
    captioned: usize,
    preprocess_failures: usize,
    caption_failures: usize,
    persist_failures: usize,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
