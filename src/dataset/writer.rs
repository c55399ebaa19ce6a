//! Append-only dataset writer.
//!
//! The CSV file is created (truncating any previous one) when the writer is
//! built and every row is flushed as soon as it is recorded, so an
//! interrupted run still leaves a valid partial table. The JSON manifest is
//! written once by [`DatasetWriter::finish`].
//!
//! A record lands in every enabled sink or in none: the text file is
//! written first and removed again if the CSV row cannot be appended.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::config::config::{CSV_FILE_NAME, JSON_FILE_NAME};
use crate::dataset::csv;
use crate::dataset::manifest::{Dataset, DatasetInfo, ImageRecord};
use crate::error::{CaptionerError, CaptionerResult};

/// Which sinks are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub write_text: bool,
    pub write_csv: bool,
    pub write_json: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            write_text: true,
            write_csv: true,
            write_json: true,
        }
    }
}

impl From<&RunConfig> for SinkOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            write_text: config.write_text,
            write_csv: config.write_csv,
            write_json: config.write_json,
        }
    }
}

pub struct DatasetWriter {
    output_dir: PathBuf,
    options: SinkOptions,
    csv: Option<File>,
    dataset: Dataset,
}

impl DatasetWriter {
    /// Open the sinks in `output_dir`. The directory must already exist.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        options: SinkOptions,
        info: DatasetInfo,
    ) -> CaptionerResult<Self> {
        let output_dir = output_dir.into();
        let csv = if options.write_csv {
            let path = output_dir.join(CSV_FILE_NAME);
            let mut file =
                File::create(&path).map_err(|e| CaptionerError::io("create csv", &path, e))?;
            file.write_all(csv::format_row(&csv::HEADER).as_bytes())
                .and_then(|_| file.flush())
                .map_err(|e| CaptionerError::io("write csv header", &path, e))?;
            debug!(path = %path.display(), "Opened CSV sink");
            Some(file)
        } else {
            None
        };

        Ok(Self {
            output_dir,
            options,
            csv,
            dataset: Dataset::new(info),
        })
    }

    /// Persist one record to every enabled sink, then keep it for the manifest.
    ///
    /// On error the record is not added to the manifest.
    pub fn record(&mut self, record: ImageRecord) -> CaptionerResult<()> {
        let text_path = if self.options.write_text {
            let path = self.text_path(&record.processed_filename);
            fs::write(&path, &record.caption)
                .map_err(|e| CaptionerError::io("write caption", &path, e))?;
            Some(path)
        } else {
            None
        };

        if let Err(e) = self.append_row(&record) {
            if let Some(path) = text_path {
                if let Err(remove) = fs::remove_file(&path) {
                    warn!(
                        path = %path.display(),
                        "Failed to remove orphaned caption file: {remove}"
                    );
                }
            }
            return Err(e);
        }

        self.dataset.push(record);
        Ok(())
    }

    fn append_row(&mut self, record: &ImageRecord) -> CaptionerResult<()> {
        let Some(file) = self.csv.as_mut() else {
            return Ok(());
        };
        let row = csv::format_row(&[&record.caption, &record.processed_filename]);
        file.write_all(row.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| {
                CaptionerError::io("append csv row", self.output_dir.join(CSV_FILE_NAME), e)
            })
    }

    /// Text file path for a processed image: same stem, `.txt` extension.
    pub fn text_path(&self, processed_filename: &str) -> PathBuf {
        let stem = Path::new(processed_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| processed_filename.to_string());
        self.output_dir.join(format!("{stem}.txt"))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Close the CSV sink and write the JSON manifest if enabled.
    ///
    /// Returns the collected dataset and the manifest path when one was written.
    pub fn finish(self) -> CaptionerResult<(Dataset, Option<PathBuf>)> {
        drop(self.csv);
        if !self.options.write_json {
            return Ok((self.dataset, None));
        }

        let path = self.output_dir.join(JSON_FILE_NAME);
        let json = serde_json::to_string_pretty(&self.dataset)?;
        fs::write(&path, json).map_err(|e| CaptionerError::io("write manifest", &path, e))?;
        info!(path = %path.display(), images = self.dataset.len(), "Wrote dataset manifest");
        Ok((self.dataset, Some(path)))
    }
}
