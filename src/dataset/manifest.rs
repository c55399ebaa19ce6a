//! Dataset manifest types, serialized to `dataset.json`.
//!
//! ```json
//! {
//!   "info": {"description": "...", "version": "1.0", "date_created": "...",
//!            "image_size": [1024, 1024], "format": "JPEG"},
//!   "images": [{"file_name": "image0.jpg", "caption": "..."}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use letterbox::Size;

pub const DATASET_DESCRIPTION: &str = "Image captions for diffusion model training";
pub const DATASET_VERSION: &str = "1.0";

/// One successfully captioned image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Source file name, kept for logs and summaries only
    #[serde(skip)]
    pub original_filename: String,
    #[serde(rename = "file_name")]
    pub processed_filename: String,
    pub caption: String,
}

impl ImageRecord {
    pub fn new(
        original_filename: impl Into<String>,
        processed_filename: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            processed_filename: processed_filename.into(),
            caption: caption.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub description: String,
    pub version: String,
    pub date_created: String,
    pub image_size: [u32; 2],
    pub format: String,
}

impl DatasetInfo {
    /// Info block stamped with the current UTC time.
    pub fn new(image_size: Size, format: &str) -> Self {
        Self {
            description: DATASET_DESCRIPTION.to_string(),
            version: DATASET_VERSION.to_string(),
            date_created: chrono::Utc::now().to_rfc3339(),
            image_size: [image_size.w, image_size.h],
            format: format.to_string(),
        }
    }
}

/// Records of one run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub info: DatasetInfo,
    pub images: Vec<ImageRecord>,
}

impl Dataset {
    pub fn new(info: DatasetInfo) -> Self {
        Self {
            info,
            images: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ImageRecord) {
        self.images.push(record);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
