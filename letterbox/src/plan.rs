// SPDX-License-Identifier: MIT
//! # Canvas Placement Planning
//!
//! Computes where a source image lands on a fixed-size canvas.
//!
//! The scale factor is `min(canvas.w / src.w, canvas.h / src.h)`, so the
//! resized content always fits entirely inside the canvas with its aspect
//! ratio preserved. Unlike a max-side clamp this may upscale small sources:
//! a 256×128 image planned onto a 1024×1024 canvas becomes 1024×512.
//!
//! The content is centered with floor division, so when the leftover space
//! is odd the extra pixel ends up on the right/bottom edge.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of bytes for a tightly packed buffer at `channels` bytes per pixel.
    pub fn byte_len(&self, channels: usize) -> usize {
        (self.w as usize) * (self.h as usize) * channels
    }
}

/// Complete placement plan for one source image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitPlan {
    /// Original input dimensions
    pub input: Size,
    /// Final canvas dimensions, always equal to the requested canvas
    pub canvas: Size,
    /// Dimensions of the resized content inside the canvas
    pub content: Size,
    /// Top-left corner of the content on the canvas
    pub offset: (u32, u32),
    /// Uniform scale factor applied to the input
    pub ratio: f64,
}

impl FitPlan {
    /// Content rectangle as `(x, y, width, height)` in canvas coordinates.
    pub fn content_roi(&self) -> (u32, u32, u32, u32) {
        (self.offset.0, self.offset.1, self.content.w, self.content.h)
    }

    /// True if the pixel at `(x, y)` on the canvas belongs to the padding.
    pub fn is_padding(&self, x: u32, y: u32) -> bool {
        let (ox, oy, w, h) = self.content_roi();
        x < ox || y < oy || x >= ox + w || y >= oy + h
    }
}

/// Plan how `input` is scaled and placed onto `canvas`.
///
/// Returns `None` when either size is empty, since no finite ratio exists.
pub fn build_plan(input: Size, canvas: Size) -> Option<FitPlan> {
    if input.is_empty() || canvas.is_empty() {
        return None;
    }
    let (ratio, content) = fit_within(input, canvas);
    Some(FitPlan {
        input,
        canvas,
        content,
        offset: ((canvas.w - content.w) / 2, (canvas.h - content.h) / 2),
        ratio,
    })
}

/// Fit `input` inside `box_` preserving aspect ratio, upscaling if needed.
///
/// Each side is rounded to the nearest pixel and clamped to `[1, box side]`.
fn fit_within(input: Size, box_: Size) -> (f64, Size) {
    let (w, h) = (input.w as f64, input.h as f64);
    let (bw, bh) = (box_.w as f64, box_.h as f64);
    let s = (bw / w).min(bh / h);
    let out = Size {
        w: ((w * s).round() as u32).clamp(1, box_.w),
        h: ((h * s).round() as u32).clamp(1, box_.h),
    };
    (s, out)
}
