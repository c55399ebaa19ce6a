//! # Image Preprocessor
//!
//! Every image entering the dataset goes through the same four steps:
//! 1. **Decode** with the `image` crate and drop alpha/palette by converting to RGB8
//! 2. **Plan** a fit-within scale onto the target canvas ([`letterbox::build_plan`])
//! 3. **Resize** with Lanczos3 into the centered content rectangle, padding the rest
//! 4. **Encode** to the configured format as `image{index}.{ext}`
//!
//! Output names depend only on the index, so duplicate input names never
//! collide and reruns overwrite the same files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fast_image_resize::Resizer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use letterbox::{ScaleError, Size, build_plan, letterbox_rgb};
use tracing::{debug, warn};

use crate::error::{CaptionerError, CaptionerResult};

/// Encoded format of processed canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG with the given quality (1-100)
    Jpeg { quality: u8 },
    /// Lossless PNG
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 95 }
    }
}

impl OutputFormat {
    /// File extension used for processed images.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }

    /// Upper-case label recorded in the dataset manifest.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "JPEG",
            Self::Png => "PNG",
        }
    }
}

/// Canvas geometry and encoding for one preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    pub target_size: Size,
    pub output_format: OutputFormat,
    /// Padding color around the resized content
    pub background: [u8; 3],
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_size: Size::new(1024, 1024),
            output_format: OutputFormat::default(),
            background: letterbox::BLACK,
        }
    }
}

impl PreprocessConfig {
    pub fn new(width: u32, height: u32, output_format: OutputFormat) -> Self {
        Self {
            target_size: Size::new(width, height),
            output_format,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CaptionerResult<()> {
        if self.target_size.w == 0 {
            return Err(CaptionerError::config("width", "0", "must be greater than 0"));
        }
        if self.target_size.h == 0 {
            return Err(CaptionerError::config("height", "0", "must be greater than 0"));
        }
        if let OutputFormat::Jpeg { quality } = self.output_format {
            if !(1..=100).contains(&quality) {
                return Err(CaptionerError::config(
                    "quality",
                    quality.to_string(),
                    "must be between 1 and 100",
                ));
            }
        }
        Ok(())
    }
}

/// Name of the processed image for `index`.
pub fn processed_filename(index: usize, format: OutputFormat) -> String {
    format!("image{}.{}", index, format.extension())
}

/// Turns source images into uniform canvases. Holds a reusable resizer.
pub struct Preprocessor {
    config: PreprocessConfig,
    resizer: Resizer,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self {
            config,
            resizer: Resizer::new(),
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Preprocess `input` into `output_dir`, logging and swallowing any failure.
    ///
    /// Returns the output file name, or `None` if the image must be skipped.
    pub fn preprocess(&mut self, input: &Path, output_dir: &Path, index: usize) -> Option<String> {
        match self.try_preprocess(input, output_dir, index) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(file = %input.display(), category = e.category(), "Error preprocessing: {e}");
                None
            }
        }
    }

    /// Preprocess `input` into `output_dir/image{index}.{ext}`.
    pub fn try_preprocess(
        &mut self,
        input: &Path,
        output_dir: &Path,
        index: usize,
    ) -> CaptionerResult<String> {
        let rgb = image::open(input)
            .map_err(|source| CaptionerError::Decode {
                path: input.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let canvas = self.render(&rgb).map_err(|source| CaptionerError::Scale {
            path: input.to_path_buf(),
            source,
        })?;

        let filename = processed_filename(index, self.config.output_format);
        let output_path = output_dir.join(&filename);
        self.save(&canvas, &output_path)?;

        debug!(
            file = %input.display(),
            output = %output_path.display(),
            src_w = rgb.width(),
            src_h = rgb.height(),
            "Preprocessed image"
        );
        Ok(filename)
    }

    /// Letterbox a decoded image onto the configured canvas.
    pub fn render(&mut self, rgb: &RgbImage) -> Result<RgbImage, ScaleError> {
        let input = Size::new(rgb.width(), rgb.height());
        let target = self.config.target_size;
        let plan = build_plan(input, target).ok_or(ScaleError::EmptyImage(input))?;

        let buf = letterbox_rgb(&mut self.resizer, rgb.as_raw(), &plan, self.config.background)?;
        let actual = buf.len();
        RgbImage::from_raw(target.w, target.h, buf).ok_or(ScaleError::BufferTooSmall {
            expected: target.byte_len(3),
            actual,
        })
    }

    fn save(&self, canvas: &RgbImage, path: &Path) -> CaptionerResult<()> {
        let encode_err = |source: image::ImageError| CaptionerError::Encode {
            path: path.to_path_buf(),
            source,
        };
        match self.config.output_format {
            OutputFormat::Jpeg { quality } => {
                let file = File::create(path)
                    .map_err(|e| CaptionerError::io("create image", path, e))?;
                let mut writer = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut writer, quality)
                    .encode_image(canvas)
                    .map_err(encode_err)?;
                writer.flush().map_err(|e| CaptionerError::io("write image", path, e))
            }
            OutputFormat::Png => canvas
                .save_with_format(path, ImageFormat::Png)
                .map_err(encode_err),
        }
    }
}
