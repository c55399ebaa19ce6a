//! # Run Configuration
//!
//! Options for a single pass over an input folder. The CLI builds one of
//! these from its flags; library users can construct it directly.
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | `input_folder` | `input` | Folder scanned for images (not recursive) |
//! | `output_folder` | `output` | Receives `image{N}.*`, `captions.csv`, `dataset.json` |
//! | `prefix` | empty | Prepended as `{prefix}, ` to every caption |
//! | `suffix` | empty | Appended as `, {suffix}` to every caption |
//! | `write_json` | `true` | Write `dataset.json` at the end of the run |
//! | `write_csv` | `true` | Append rows to `captions.csv` as images complete |
//! | `write_text` | `true` | Write one `image{N}.txt` per captioned image |
//!
//! ```rust
//! use dataset_captioner::config::RunConfig;
//!
//! let config = RunConfig::new("photos", "dataset")
//!     .with_prefix("in the style of TOK")
//!     .with_suffix("high quality");
//! assert!(config.validate().is_ok());
//! ```

use std::path::{Component, Path, PathBuf};

use crate::error::{CaptionerError, CaptionerResult};

/// File name of the incremental CSV table inside the output folder.
pub const CSV_FILE_NAME: &str = "captions.csv";
/// File name of the end-of-run manifest inside the output folder.
pub const JSON_FILE_NAME: &str = "dataset.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub prefix: String,
    pub suffix: String,
    pub write_json: bool,
    pub write_csv: bool,
    pub write_text: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("input"),
            output_folder: PathBuf::from("output"),
            prefix: String::new(),
            suffix: String::new(),
            write_json: true,
            write_csv: true,
            write_text: true,
        }
    }
}

impl RunConfig {
    pub fn new(input_folder: impl Into<PathBuf>, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.write_json = enabled;
        self
    }

    pub fn with_csv(mut self, enabled: bool) -> Self {
        self.write_csv = enabled;
        self
    }

    pub fn with_text(mut self, enabled: bool) -> Self {
        self.write_text = enabled;
        self
    }

    /// Reject configurations that would clobber inputs or produce nothing useful.
    pub fn validate(&self) -> CaptionerResult<()> {
        if self.input_folder.as_os_str().is_empty() {
            return Err(CaptionerError::config("input_folder", "", "must not be empty"));
        }
        if self.output_folder.as_os_str().is_empty() {
            return Err(CaptionerError::config("output_folder", "", "must not be empty"));
        }
        // Outputs are named image{N}.jpg and would overwrite same-named inputs.
        if same_folder(&self.input_folder, &self.output_folder) {
            return Err(CaptionerError::config(
                "output_folder",
                self.output_folder.display().to_string(),
                "must differ from input_folder",
            ));
        }
        Ok(())
    }
}

/// Existing folders compare by canonical path, others by their components
/// with `.` segments dropped.
fn same_folder(a: &Path, b: &Path) -> bool {
    resolve(a) == resolve(b)
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}
